mod sync_ext;

pub use sync_ext::{CondvarExt, MutexExt, RwLockExt};
