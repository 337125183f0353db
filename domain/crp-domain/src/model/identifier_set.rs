//! テレメトリ識別子セット（値オブジェクト）

/// storage.json 内のキー名
pub const KEY_MACHINE_ID: &str = "telemetry.machineId";
pub const KEY_MAC_MACHINE_ID: &str = "telemetry.macMachineId";
pub const KEY_DEV_DEVICE_ID: &str = "telemetry.devDeviceId";
pub const KEY_SQM_ID: &str = "telemetry.sqmId";

/// 4つのテレメトリキー（書き込み順）
pub const TELEMETRY_KEYS: [&str; 4] = [
    KEY_MACHINE_ID,
    KEY_MAC_MACHINE_ID,
    KEY_DEV_DEVICE_ID,
    KEY_SQM_ID,
];

/// 一度に生成される4つの識別子。生成後は変更不可。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSet {
    machine_id: String,
    mac_machine_id: String,
    dev_device_id: String,
    sqm_id: String,
}

impl IdentifierSet {
    /// 生成済みの値から組み立てる（生成は `IdentifierFactory` が担当）
    pub(crate) fn from_parts(
        machine_id: String,
        mac_machine_id: String,
        dev_device_id: String,
        sqm_id: String,
    ) -> Self {
        Self {
            machine_id,
            mac_machine_id,
            dev_device_id,
            sqm_id,
        }
    }

    /// 64桁の小文字16進
    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// テンプレート置換で作る UUID 形式
    pub fn mac_machine_id(&self) -> &str {
        &self.mac_machine_id
    }

    /// 小文字ハイフン区切りの UUID
    pub fn dev_device_id(&self) -> &str {
        &self.dev_device_id
    }

    /// `{` `}` で囲んだ大文字 UUID
    pub fn sqm_id(&self) -> &str {
        &self.sqm_id
    }

    /// (キー, 値) の組を書き込み順で返す
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            (KEY_MACHINE_ID, self.machine_id.as_str()),
            (KEY_MAC_MACHINE_ID, self.mac_machine_id.as_str()),
            (KEY_DEV_DEVICE_ID, self.dev_device_id.as_str()),
            (KEY_SQM_ID, self.sqm_id.as_str()),
        ]
    }
}
