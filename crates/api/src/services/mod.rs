pub mod slot_reconciler;

pub use slot_reconciler::{spawn_slot_reconciler, ReconcilerConfig, SlotReconciler};
