//! storage.json の部分マージ
//!
//! 4つのテレメトリキーだけを差し替え、それ以外のキーと並び順はそのまま残す。
//! 出力は2スペースインデント。元が CRLF なら CRLF で書き戻す（BOM は書かない）。

use std::fs;
use std::path::Path;

use crp_domain::DomainError;
use crp_domain::model::IdentifierSet;
use crp_domain::port::driven::IdentityStore;
use serde_json::{Map, Value};
use tracing::debug;

use crate::fsutil::overwrite_preserving_mode;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonIdentityStore;

impl JsonIdentityStore {
    pub fn new() -> Self {
        Self
    }
}

fn corrupt(path: &Path, detail: impl Into<String>) -> DomainError {
    DomainError::StoreCorrupt {
        path: path.display().to_string(),
        detail: detail.into(),
    }
}

/// 読み込んだテキストを解析し、改行コードと末尾改行の有無を返す
fn parse_store(path: &Path, bytes: &[u8]) -> Result<(Map<String, Value>, bool, bool), DomainError> {
    let text = std::str::from_utf8(bytes).map_err(|e| corrupt(path, format!("not UTF-8: {e}")))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let crlf = text.contains("\r\n");
    let trailing_newline = text.ends_with('\n');

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok((map, crlf, trailing_newline)),
        Ok(other) => Err(corrupt(
            path,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(corrupt(path, e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn render(map: &Map<String, Value>, crlf: bool, trailing_newline: bool) -> Result<String, DomainError> {
    let mut out = serde_json::to_string_pretty(map)
        .map_err(|e| DomainError::Unknown(format!("serialize storage.json: {e}")))?;
    if trailing_newline {
        out.push('\n');
    }
    if crlf {
        out = out.replace('\n', "\r\n");
    }
    Ok(out)
}

impl IdentityStore for JsonIdentityStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn merge_identifiers(&self, path: &Path, set: &IdentifierSet) -> Result<(), DomainError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DomainError::StoreNotFound(path.display().to_string()),
            _ => DomainError::from_io(format!("read {}", path.display()), &e),
        })?;
        let (mut map, crlf, trailing_newline) = parse_store(path, &bytes)?;

        for (key, value) in set.entries() {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }

        let out = render(&map, crlf, trailing_newline)?;
        overwrite_preserving_mode(path, out.as_bytes())?;
        debug!(path = %path.display(), keys = map.len(), crlf, "identity store rewritten");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crp_domain::model::TELEMETRY_KEYS;
    use crp_domain::port::driven::RandomSource;
    use crp_domain::service::IdentifierFactory;
    use std::cell::Cell;

    struct Step(Cell<u8>);

    impl RandomSource for Step {
        fn fill_bytes(&self, buf: &mut [u8]) {
            for b in buf.iter_mut() {
                self.0.set(self.0.get().wrapping_add(37));
                *b = self.0.get();
            }
        }
    }

    fn new_set() -> IdentifierSet {
        IdentifierFactory::new(&Step(Cell::new(3))).new_set()
    }

    fn read_json(path: &Path) -> Map<String, Value> {
        let text = fs::read_to_string(path).unwrap();
        match serde_json::from_str::<Value>(&text).unwrap() {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn merge_keeps_unrelated_keys_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(
            &path,
            r#"{"z.first": true, "a": 1, "telemetry.machineId": "old", "nested": {"k": [1, 2]}}"#,
        )
        .unwrap();
        let set = new_set();

        JsonIdentityStore::new().merge_identifiers(&path, &set).unwrap();

        let map = read_json(&path);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "z.first",
                "a",
                "telemetry.machineId",
                "nested",
                "telemetry.macMachineId",
                "telemetry.devDeviceId",
                "telemetry.sqmId",
            ]
        );
        assert_eq!(map["a"], Value::from(1));
        assert_eq!(map["nested"]["k"], serde_json::json!([1, 2]));
        assert_eq!(map["telemetry.machineId"], Value::from(set.machine_id()));
        assert_eq!(set.machine_id().len(), 64);
        for key in TELEMETRY_KEYS {
            assert!(map[key].is_string());
        }
    }

    #[test]
    fn output_is_indented_with_two_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{\"a\":1}").unwrap();
        JsonIdentityStore::new()
            .merge_identifiers(&path, &new_set())
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"a\": 1,\n"));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn crlf_and_bom_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "\u{feff}{\r\n  \"a\": \"b\"\r\n}\r\n").unwrap();

        JsonIdentityStore::new()
            .merge_identifiers(&path, &new_set())
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.starts_with('\u{feff}'));
        assert!(text.ends_with("}\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
        assert_eq!(read_json(&path)["a"], Value::from("b"));
    }

    #[test]
    fn unrelated_numbers_keep_their_exact_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"zoom": 1.10, "big": 123456789012345678901234567890}"#).unwrap();

        JsonIdentityStore::new()
            .merge_identifiers(&path, &new_set())
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""zoom": 1.10"#));
        assert!(text.contains(r#""big": 123456789012345678901234567890"#));
    }

    #[test]
    fn non_object_or_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = JsonIdentityStore::new();

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            store.merge_identifiers(&path, &new_set()),
            Err(DomainError::StoreCorrupt { detail, .. }) if detail.contains("array")
        ));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            store.merge_identifiers(&path, &new_set()),
            Err(DomainError::StoreCorrupt { .. })
        ));
        // 壊れた内容は書き換えない
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn missing_file_is_store_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = JsonIdentityStore::new();
        assert!(!store.exists(&path));
        assert!(matches!(
            store.merge_identifiers(&path, &new_set()),
            Err(DomainError::StoreNotFound(_))
        ));
    }
}
