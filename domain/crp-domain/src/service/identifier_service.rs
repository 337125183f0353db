//! 識別子生成サービス
//!
//! I/O なし。乱数は `RandomSource` ポートから受け取るため、
//! 呼び出しごとに独立した値になる（固定シードは持たない）。

use uuid::{Builder, Uuid};

use crate::model::IdentifierSet;
use crate::port::driven::RandomSource;

/// macMachineId のテンプレート。`x` は任意の4bit、`y` は上位2bitが `10`
pub const MAC_MACHINE_ID_TEMPLATE: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

const HEX: &[u8; 16] = b"0123456789abcdef";

pub struct IdentifierFactory<'a, R: RandomSource + ?Sized> {
    random: &'a R,
}

impl<'a, R: RandomSource + ?Sized> IdentifierFactory<'a, R> {
    pub fn new(random: &'a R) -> Self {
        Self { random }
    }

    /// 4つの識別子をまとめて新規生成
    pub fn new_set(&self) -> IdentifierSet {
        let machine_id = format!(
            "{}{}",
            self.random_uuid().simple(),
            self.random_uuid().simple()
        );
        let mac_machine_id = self.templated_mac_machine_id();
        let dev_device_id = self.random_uuid().hyphenated().to_string();
        let sqm_id = format!(
            "{{{}}}",
            self.random_uuid().hyphenated().to_string().to_uppercase()
        );
        IdentifierSet::from_parts(machine_id, mac_machine_id, dev_device_id, sqm_id)
    }

    /// レジストリ用の MachineGuid（小文字ハイフン区切り）
    pub fn new_machine_guid(&self) -> String {
        self.random_uuid().hyphenated().to_string()
    }

    fn random_uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.random.fill_bytes(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid()
    }

    fn templated_mac_machine_id(&self) -> String {
        let slots = MAC_MACHINE_ID_TEMPLATE
            .bytes()
            .filter(|b| *b == b'x' || *b == b'y')
            .count();
        let mut entropy = vec![0u8; slots];
        self.random.fill_bytes(&mut entropy);

        let mut nibbles = entropy.into_iter().map(|b| b & 0x0f);
        MAC_MACHINE_ID_TEMPLATE
            .bytes()
            .map(|b| match b {
                b'x' => HEX[nibbles.next().unwrap_or(0) as usize] as char,
                b'y' => HEX[((nibbles.next().unwrap_or(0) & 0x3) | 0x8) as usize] as char,
                other => other as char,
            })
            .collect()
    }
}
