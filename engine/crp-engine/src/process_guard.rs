//! 対象アプリケーションの起動確認と終了待ち

use std::time::Instant;

use crp_domain::DomainError;
use crp_domain::model::{CancellationToken, WaitPolicy};
use crp_domain::port::driven::{ProcessProbe, StatusSink};
use crp_domain::service::is_target_process;
use tracing::{debug, warn};

pub struct ProcessGuard<'a> {
    probe: &'a dyn ProcessProbe,
}

impl<'a> ProcessGuard<'a> {
    pub fn new(probe: &'a dyn ProcessProbe) -> Self {
        Self { probe }
    }

    /// プロセス一覧を1回調べる。列挙自体に失敗した場合は false（利用者を止めない）
    pub fn is_running(&self, process_name: &str) -> bool {
        match self.probe.process_names() {
            Ok(names) => names.iter().any(|n| is_target_process(n, process_name)),
            Err(err) => {
                warn!(error = %err, "process enumeration failed; assuming not running");
                false
            }
        }
    }

    /// 対象が終了するまでポーリングする。
    /// キャンセルで `Cancelled`、期限切れで `Timeout` を返す。
    pub fn wait_until_stopped(
        &self,
        process_name: &str,
        policy: &WaitPolicy,
        cancel: &CancellationToken,
        sink: &dyn StatusSink,
    ) -> Result<(), DomainError> {
        let started = Instant::now();
        let mut polls: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(DomainError::Cancelled(format!(
                    "wait for {process_name} to exit"
                )));
            }
            if !self.is_running(process_name) {
                debug!(process = process_name, polls, "process not running");
                return Ok(());
            }

            polls += 1;
            if polls == 1 {
                sink.warn(&format!("Waiting for {process_name} to exit..."));
            }

            let mut sleep = policy.poll_interval;
            if let Some(limit) = policy.timeout {
                let elapsed = started.elapsed();
                if elapsed >= limit {
                    return Err(DomainError::Timeout(format!(
                        "{process_name} still running after {}s",
                        limit.as_secs_f64()
                    )));
                }
                sleep = sleep.min(limit - elapsed);
            }

            if cancel.wait_timeout(sleep) {
                return Err(DomainError::Cancelled(format!(
                    "wait for {process_name} to exit"
                )));
            }
        }
    }
}
