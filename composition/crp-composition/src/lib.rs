//! crp-composition: CLI 向けのランタイムを組み立てるコンポジションルート。
//! ドメイン／アプリケーション／各種アダプタをここで配線し、apps/* はこのクレートだけに依存する。

pub mod cli;
pub mod console;
pub mod error;

// apps/* が内側レイヤーの型に触れる必要がある場合は、ここから辿れるようにする。
pub use crp_app as app;
pub use crp_domain as domain;
pub use crp_engine as engine;

pub use crp_adapter_paths::{ProductDirs, HOME_ENV};
pub use crp_adapter_registry::is_elevated;
pub use crp_log_utils::init_logging;

pub use cli::CliRuntime;
pub use console::ConsoleStatusSink;
