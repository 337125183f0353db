//! プロセス列挙アダプター

use crp_domain::DomainError;
use crp_domain::port::driven::ProcessProbe;
use sysinfo::System;
use tracing::trace;

/// 呼び出しごとにプロセス一覧を取り直す
#[derive(Debug, Default)]
pub struct SysinfoProbe;

impl SysinfoProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessProbe for SysinfoProbe {
    fn process_names(&self) -> Result<Vec<String>, DomainError> {
        let mut system = System::new();
        system.refresh_processes();
        let names: Vec<String> = system
            .processes()
            .values()
            .map(|p| p.name().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        trace!(count = names.len(), "process snapshot");
        Ok(names)
    }
}
