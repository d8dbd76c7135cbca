use rusqlite::{Transaction, TransactionBehavior};

use crate::error::Result;
use crate::model::OptionDraft;
use crate::store::Store;

/// Starter categories with two options each: (category, [(option, tag)]).
pub const DEFAULT_CATEGORIES: &[(&str, &[(&str, &str)])] = &[
    ("Meal", &[("Pizza", "Fast"), ("Salad", "Healthy")]),
    ("Outfit", &[("Jeans & T-Shirt", "Casual"), ("Suit", "Formal")]),
    ("Workout", &[("Run", "Cardio"), ("Weights", "Strength")]),
];

impl Store {
    /// Insert the starter categories when the store has none.
    /// Returns whether anything was inserted. The emptiness check and the
    /// inserts share one IMMEDIATE transaction, so two processes opening a
    /// fresh data directory together seed it once.
    pub fn seed_defaults(&self, no_repeat_days: u32) -> Result<bool> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        let seeded = self.insert_defaults(no_repeat_days)?;
        tx.commit()?;
        if seeded {
            tracing::info!("seeded default categories");
        }
        Ok(seeded)
    }

    /// Delete every category, option and pick, then re-seed the defaults.
    /// Nothing is deleted unless the re-seed succeeds too.
    pub fn reset_all(&self, no_repeat_days: u32) -> Result<()> {
        let tx = Transaction::new_unchecked(self.conn(), TransactionBehavior::Immediate)?;
        tx.execute_batch("DELETE FROM picks; DELETE FROM options; DELETE FROM categories;")?;
        self.insert_defaults(no_repeat_days)?;
        tx.commit()?;
        tracing::info!("reset all data");
        Ok(())
    }

    /// Caller holds the transaction.
    fn insert_defaults(&self, no_repeat_days: u32) -> Result<bool> {
        if !self.list_categories()?.is_empty() {
            return Ok(false);
        }
        for (name, options) in DEFAULT_CATEGORIES {
            let category = self.add_category(name, no_repeat_days)?;
            for (option, tag) in *options {
                self.add_option(category.id, &OptionDraft::new(option).with_tags(&[tag]))?;
            }
        }
        Ok(true)
    }
}
