// Rust guideline compliant 2026-10-18

//! Hardware catalog -- id lookup and selection state.
//!
//! Entry points: [`Catalog::load`], [`Catalog::resolve`],
//! [`Catalog::set_selection`].
//!
//! The id index is built once per load and never changes afterwards, so the
//! resolve path is lock-free and independent of the selection flags. The
//! flags live behind a `tokio::sync::RwLock`: a selection update is a single
//! write-locked critical section and readers never observe a half-applied
//! selection.

use domain::{Brand, CatalogError, CatalogSource, ConfigId, HardwareConfiguration};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable part of a catalog entry.
#[derive(Debug)]
struct Device {
    id: ConfigId,
    brand: Brand,
    model: String,
}

/// In-memory hardware catalog indexed by [`ConfigId`].
///
/// Shared by reference (or `Arc`) between concurrent requests; every method
/// takes `&self`.
#[derive(Debug)]
pub struct Catalog {
    devices: Vec<Device>,
    /// id -> position in `devices`; built once in [`from_entries`](Self::from_entries).
    index: HashMap<ConfigId, usize>,
    /// `selected[i]` is the flag of `devices[i]`.
    selected: RwLock<Vec<bool>>,
}

impl Catalog {
    /// Build a catalog from loaded entries, keeping their initial selection flags.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateConfiguration`] when two entries share an id.
    pub fn from_entries(entries: Vec<HardwareConfiguration>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        let mut devices = Vec::with_capacity(entries.len());
        let mut selected = Vec::with_capacity(entries.len());

        for entry in entries {
            if index.insert(entry.id, devices.len()).is_some() {
                return Err(CatalogError::DuplicateConfiguration { id: entry.id });
            }
            selected.push(entry.is_selected);
            devices.push(Device { id: entry.id, brand: entry.brand, model: entry.model });
        }

        tracing::debug!(entries = devices.len(), "catalog.indexed");
        Ok(Self { devices, index, selected: RwLock::new(selected) })
    }

    /// Load all configurations from `source` and index them.
    ///
    /// # Errors
    ///
    /// Propagates source failures and [`CatalogError::DuplicateConfiguration`].
    pub async fn load<S: CatalogSource>(source: &S) -> Result<Self, CatalogError> {
        let entries = source.load_configurations().await?;
        let catalog = Self::from_entries(entries)?;
        tracing::info!(entries = catalog.len(), "catalog.loaded");
        Ok(catalog)
    }

    /// Look up brand and model for `id` in O(1).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownConfiguration`] when `id` is absent.
    pub fn resolve(&self, id: ConfigId) -> Result<(Brand, &str), CatalogError> {
        self.index
            .get(&id)
            .map(|&i| {
                let device = &self.devices[i];
                (device.brand, device.model.as_str())
            })
            .ok_or(CatalogError::UnknownConfiguration { id })
    }

    /// `true` when `id` is in the catalog.
    #[must_use]
    pub fn contains(&self, id: ConfigId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// `true` when the catalog holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All ids, in load order.
    #[must_use]
    pub fn ids(&self) -> Vec<ConfigId> {
        self.devices.iter().map(|d| d.id).collect()
    }

    // -- selection state ----------------------------------------------------

    /// Overwrite the selection of the whole catalog.
    ///
    /// Every entry whose id is in `ids` becomes selected; every other entry
    /// becomes unselected. Ids absent from the catalog are ignored.
    pub async fn set_selection(&self, ids: &[ConfigId]) {
        let wanted: HashSet<ConfigId> = ids.iter().copied().collect();
        for id in wanted.iter().filter(|id| !self.contains(**id)) {
            tracing::debug!(%id, "catalog.selection.unknown_id");
        }

        let mut selected = self.selected.write().await;
        for (flag, device) in selected.iter_mut().zip(&self.devices) {
            *flag = wanted.contains(&device.id);
        }
        tracing::debug!(requested = ids.len(), "catalog.selection.updated");
    }

    /// Current selection flag of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownConfiguration`] when `id` is absent.
    pub async fn is_selected(&self, id: ConfigId) -> Result<bool, CatalogError> {
        let &i = self.index.get(&id).ok_or(CatalogError::UnknownConfiguration { id })?;
        Ok(self.selected.read().await[i])
    }

    /// Ids of the selected entries, in load order and without duplicates.
    pub async fn selected_ids(&self) -> Vec<ConfigId> {
        let selected = self.selected.read().await;
        self.devices
            .iter()
            .zip(selected.iter())
            .filter(|&(_, &flag)| flag)
            .map(|(d, _)| d.id)
            .collect()
    }

    /// Snapshot of every entry with its current selection flag.
    pub async fn entries(&self) -> Vec<HardwareConfiguration> {
        let selected = self.selected.read().await;
        self.devices
            .iter()
            .zip(selected.iter())
            .map(|(d, &is_selected)| HardwareConfiguration {
                id: d.id,
                brand: d.brand,
                model: d.model.clone(),
                is_selected,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::Catalog;
    use domain::{
        Brand, CatalogError, CatalogSource, ConfigId, HardwareConfiguration, TransactionHistory,
    };
    use std::sync::Arc;

    fn hw(id: u32, brand: Brand, model: &str) -> HardwareConfiguration {
        HardwareConfiguration::new(ConfigId(id), brand, model)
    }

    fn make_catalog() -> Catalog {
        Catalog::from_entries(vec![
            hw(1, Brand::Apple, "iPhone 12"),
            hw(2, Brand::Samsung, "Galaxy S21"),
            hw(3, Brand::Google, "Pixel 6"),
        ])
        .unwrap()
    }

    struct StaticSource(Vec<HardwareConfiguration>);

    impl CatalogSource for StaticSource {
        async fn load_configurations(&self) -> Result<Vec<HardwareConfiguration>, CatalogError> {
            Ok(self.0.clone())
        }

        async fn load_history(&self) -> Result<TransactionHistory, CatalogError> {
            Ok(TransactionHistory::default())
        }
    }

    struct BrokenSource;

    impl CatalogSource for BrokenSource {
        async fn load_configurations(&self) -> Result<Vec<HardwareConfiguration>, CatalogError> {
            Err(CatalogError::SourceUnavailable { reason: "disk gone".to_owned() })
        }

        async fn load_history(&self) -> Result<TransactionHistory, CatalogError> {
            Err(CatalogError::SourceUnavailable { reason: "disk gone".to_owned() })
        }
    }

    // ------------------------------------------------------------------
    // Resolver
    // ------------------------------------------------------------------

    #[test]
    fn resolve_known_id() {
        let catalog = make_catalog();
        assert_eq!(catalog.resolve(ConfigId(2)).unwrap(), (Brand::Samsung, "Galaxy S21"));
        assert_eq!(catalog.resolve(ConfigId(3)).unwrap(), (Brand::Google, "Pixel 6"));
    }

    #[test]
    fn resolve_unknown_id_is_typed_error() {
        let catalog = make_catalog();
        assert_eq!(
            catalog.resolve(ConfigId(99)),
            Err(CatalogError::UnknownConfiguration { id: ConfigId(99) })
        );
        assert!(!catalog.contains(ConfigId(99)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::from_entries(vec![
            hw(1, Brand::Apple, "iPhone 12"),
            hw(1, Brand::Apple, "iPhone 13"),
        ]);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateConfiguration { id: ConfigId(1) })
        ));
    }

    #[test]
    fn ids_keep_load_order() {
        let catalog = make_catalog();
        assert_eq!(catalog.ids(), vec![ConfigId(1), ConfigId(2), ConfigId(3)]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[tokio::test]
    async fn load_from_source() {
        let source = StaticSource(vec![hw(10, Brand::Nokia, "G50")]);
        let catalog = Catalog::load(&source).await.unwrap();
        assert_eq!(catalog.resolve(ConfigId(10)).unwrap(), (Brand::Nokia, "G50"));
    }

    #[tokio::test]
    async fn load_propagates_source_failure() {
        let result = Catalog::load(&BrokenSource).await;
        assert!(matches!(result, Err(CatalogError::SourceUnavailable { .. })));
    }

    // ------------------------------------------------------------------
    // Selection state
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn initial_flags_are_kept() {
        let mut preselected = hw(2, Brand::Samsung, "Galaxy S21");
        preselected.is_selected = true;
        let catalog =
            Catalog::from_entries(vec![hw(1, Brand::Apple, "iPhone 12"), preselected]).unwrap();
        assert_eq!(catalog.selected_ids().await, vec![ConfigId(2)]);
    }

    #[tokio::test]
    async fn selection_is_total_overwrite() {
        let catalog = make_catalog();
        catalog.set_selection(&[ConfigId(1), ConfigId(2)]).await;
        assert_eq!(catalog.selected_ids().await, vec![ConfigId(1), ConfigId(2)]);

        catalog.set_selection(&[ConfigId(2)]).await;
        assert!(!catalog.is_selected(ConfigId(1)).await.unwrap(), "stale flag left on 1");
        assert!(catalog.is_selected(ConfigId(2)).await.unwrap());
        assert!(!catalog.is_selected(ConfigId(3)).await.unwrap());
    }

    #[tokio::test]
    async fn empty_selection_clears_everything() {
        let catalog = make_catalog();
        catalog.set_selection(&[ConfigId(1), ConfigId(3)]).await;
        catalog.set_selection(&[]).await;
        assert!(catalog.selected_ids().await.is_empty());
    }

    #[tokio::test]
    async fn selection_ignores_unknown_and_duplicate_ids() {
        let catalog = make_catalog();
        catalog.set_selection(&[ConfigId(3), ConfigId(42), ConfigId(3)]).await;
        assert_eq!(catalog.selected_ids().await, vec![ConfigId(3)]);
        assert!(matches!(
            catalog.is_selected(ConfigId(42)).await,
            Err(CatalogError::UnknownConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn entries_snapshot_reflects_flags() {
        let catalog = make_catalog();
        catalog.set_selection(&[ConfigId(3)]).await;
        let entries = catalog.entries().await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].label(), "Google Pixel 6");
        let flags: Vec<bool> = entries.iter().map(|e| e.is_selected).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[tokio::test]
    async fn resolve_is_unaffected_by_selection() {
        let catalog = make_catalog();
        catalog.set_selection(&[]).await;
        assert!(catalog.resolve(ConfigId(1)).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_selection_updates_leave_a_whole_selection() {
        let catalog = Arc::new(make_catalog());
        let mut handles = Vec::new();
        for round in 0..50u32 {
            let catalog = Arc::clone(&catalog);
            handles.push(tokio::spawn(async move {
                if round % 2 == 0 {
                    catalog.set_selection(&[ConfigId(1), ConfigId(2)]).await;
                } else {
                    catalog.set_selection(&[ConfigId(3)]).await;
                }
                catalog.selected_ids().await
            }));
        }
        for handle in handles {
            let seen = handle.await.unwrap();
            assert!(
                seen == vec![ConfigId(1), ConfigId(2)] || seen == vec![ConfigId(3)],
                "observed a partial selection: {seen:?}"
            );
        }
    }
}
