//! Process-wide cache of command definitions, keyed by Rust type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::command::Command;
use crate::declare::{Declaration, Definition};

type Entry = Arc<dyn Any + Send + Sync>;

static DEFINITIONS: OnceLock<RwLock<HashMap<TypeId, Entry>>> = OnceLock::new();

fn definitions() -> &'static RwLock<HashMap<TypeId, Entry>> {
    DEFINITIONS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn lookup<C: Command>() -> Option<Arc<Definition<C>>> {
    let map = definitions().read().unwrap_or_else(PoisonError::into_inner);
    map.get(&TypeId::of::<C>())
        .cloned()
        .and_then(|entry| entry.downcast::<Definition<C>>().ok())
}

/// The definition of `C`, declaring it on first request.
///
/// Declarations run outside the lock, so a declaration may request the
/// definitions of its subcommands. If two threads race, the first inserted
/// definition is kept and returned to both.
///
/// A command that lists itself as its own subcommand recurses without end.
pub fn definition<C: Command>() -> Arc<Definition<C>> {
    if let Some(found) = lookup::<C>() {
        return found;
    }

    let built = Arc::new(C::declare(Declaration::for_type()).build(C::default));
    tracing::debug!(
        command = built.descriptors().name(),
        "registered command definition"
    );

    let mut map = definitions().write().unwrap_or_else(PoisonError::into_inner);
    let entry = map
        .entry(TypeId::of::<C>())
        .or_insert_with(|| Arc::clone(&built) as Entry);
    Arc::clone(entry)
        .downcast::<Definition<C>>()
        .unwrap_or(built)
}

/// Whether `C` has been declared in this process.
pub fn is_registered<C: Command>() -> bool {
    definitions()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&TypeId::of::<C>())
}
