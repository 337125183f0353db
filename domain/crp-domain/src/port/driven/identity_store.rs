//! 識別子ストア（storage.json）ポート

use std::path::Path;

use crate::error::DomainError;
use crate::model::IdentifierSet;

pub trait IdentityStore {
    fn exists(&self, path: &Path) -> bool;

    /// 4つのテレメトリキーだけを上書きし、他のキーと順序は保持する
    fn merge_identifiers(&self, path: &Path, set: &IdentifierSet) -> Result<(), DomainError>;
}
