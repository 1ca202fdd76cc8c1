// crates/sii-rs/src/model.rs

//! The in-memory representation of a complete SII image.

use crate::category::{
    Category, CategoryData, CategoryId, DistributedClock, FmmuCategory, General, PdoCategory,
    PdoDirection, StringsCategory, SyncManagerCategory,
};
use crate::error::GenerationError;
use crate::header::{Preamble, StdConfig};
use crate::types::CategoryType;
use crate::SiiError;
use alloc::string::String;
use alloc::vec::Vec;

/// Owns every decoded entity of an image: the fixed header, the categories
/// in image order and the bytes following the end marker.
///
/// Categories live in a single ordered arena. A [`CategoryId`] is issued on
/// insertion and never reused within one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryModel {
    preamble: Preamble,
    std_config: StdConfig,
    categories: Vec<Category>,
    next_id: u32,
    trailer: Vec<u8>,
}

impl Default for CategoryModel {
    fn default() -> Self {
        Self::new(Preamble::default(), StdConfig::default())
    }
}

impl CategoryModel {
    /// Creates a model without categories.
    pub fn new(preamble: Preamble, std_config: StdConfig) -> Self {
        Self {
            preamble,
            std_config,
            categories: Vec::new(),
            next_id: 1,
            trailer: Vec::new(),
        }
    }

    /// Builds a model from scanned parts, keeping each category's declared size.
    pub(crate) fn from_parts(
        preamble: Preamble,
        std_config: StdConfig,
        categories: Vec<Category>,
        trailer: Vec<u8>,
    ) -> Self {
        let mut model = Self::new(preamble, std_config);
        for mut category in categories {
            category.id = model.issue_id();
            model.categories.push(category);
        }
        model.trailer = trailer;
        model
    }

    fn issue_id(&mut self) -> CategoryId {
        let id = CategoryId(self.next_id);
        self.next_id += 1;
        id
    }

    // --- Fixed Header ---

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    pub fn preamble_mut(&mut self) -> &mut Preamble {
        &mut self.preamble
    }

    pub fn std_config(&self) -> &StdConfig {
        &self.std_config
    }

    pub fn std_config_mut(&mut self) -> &mut StdConfig {
        &mut self.std_config
    }

    // --- Categories ---

    /// All categories in image order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories of one type, in image order. Each call starts a fresh pass.
    pub fn categories_of_type(&self, kind: CategoryType) -> impl Iterator<Item = &Category> + '_ {
        self.categories.iter().filter(move |c| c.kind() == kind)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    /// Position of a category in image order.
    pub fn position(&self, id: CategoryId) -> Option<usize> {
        self.categories.iter().position(|c| c.id == id)
    }

    /// Appends a category at the end and returns its new id.
    /// The declared size is cleared; the generator recomputes it anyway.
    pub fn append_category(&mut self, mut category: Category) -> CategoryId {
        category.id = self.issue_id();
        category.declared_size = None;
        let id = category.id;
        self.categories.push(category);
        id
    }

    /// Inserts a category at `position` (clamped to the end).
    pub fn insert_category(&mut self, position: usize, mut category: Category) -> CategoryId {
        category.id = self.issue_id();
        category.declared_size = None;
        let id = category.id;
        let position = position.min(self.categories.len());
        self.categories.insert(position, category);
        id
    }

    /// Removes a category. Its id is not reused.
    pub fn remove_category(&mut self, id: CategoryId) -> Option<Category> {
        let position = self.position(id)?;
        Some(self.categories.remove(position))
    }

    // --- Typed Accessors ---

    /// The first Strings category.
    pub fn strings(&self) -> Option<&StringsCategory> {
        self.categories.iter().find_map(|c| match &c.data {
            CategoryData::Strings(strings) => Some(strings),
            _ => None,
        })
    }

    /// Resolves a 1-based string index against the first Strings category.
    /// Index 0 and out-of-range indices yield `None`.
    pub fn string_at(&self, index: u8) -> Option<&str> {
        self.strings()?.get(index)
    }

    /// The first General category.
    pub fn general(&self) -> Option<&General> {
        self.categories.iter().find_map(|c| match &c.data {
            CategoryData::General(general) => Some(general),
            _ => None,
        })
    }

    pub fn general_mut(&mut self) -> Option<&mut General> {
        self.categories.iter_mut().find_map(|c| match &mut c.data {
            CategoryData::General(general) => Some(general),
            _ => None,
        })
    }

    /// The first FMMU category.
    pub fn fmmus(&self) -> Option<&FmmuCategory> {
        self.categories.iter().find_map(|c| match &c.data {
            CategoryData::Fmmu(fmmus) => Some(fmmus),
            _ => None,
        })
    }

    /// The first SyncManager category.
    pub fn sync_managers(&self) -> Option<&SyncManagerCategory> {
        self.categories.iter().find_map(|c| match &c.data {
            CategoryData::SyncManager(sms) => Some(sms),
            _ => None,
        })
    }

    /// All PDO categories of one direction.
    pub fn pdos(&self, direction: PdoDirection) -> impl Iterator<Item = &PdoCategory> + '_ {
        self.categories.iter().filter_map(move |c| match &c.data {
            CategoryData::Pdo(pdo) if pdo.direction == direction => Some(pdo),
            _ => None,
        })
    }

    /// The first DistributedClock category.
    pub fn distributed_clock(&self) -> Option<&DistributedClock> {
        self.categories.iter().find_map(|c| match &c.data {
            CategoryData::DistributedClock(dc) => Some(dc),
            _ => None,
        })
    }

    /// Returns the index of `text` in the Strings category, adding it if needed.
    ///
    /// An empty text maps to index 0. A Strings category is created at the
    /// front of the model if none exists.
    pub fn add_string(&mut self, text: &str) -> Result<u8, SiiError> {
        if text.is_empty() {
            return Ok(0);
        }
        let position = match self
            .categories
            .iter()
            .position(|c| matches!(c.data, CategoryData::Strings(_)))
        {
            Some(position) => position,
            None => {
                let strings = Category::new(CategoryData::Strings(StringsCategory::new()));
                self.insert_category(0, strings);
                0
            }
        };
        let CategoryData::Strings(strings) = &mut self.categories[position].data else {
            return Ok(0);
        };
        if let Some(index) = strings.position(text) {
            return Ok(index);
        }
        if strings.len() >= usize::from(u8::MAX) {
            return Err(GenerationError::TooManyRecords {
                category: position,
                count: strings.len() + 1,
            }
            .into());
        }
        strings.strings.push(String::from(text));
        Ok(strings.len() as u8)
    }

    // --- Trailer ---

    /// Bytes found after the end marker, re-emitted verbatim.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Vec<u8>) {
        self.trailer = trailer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Pdo, PdoCategory};
    use alloc::vec;

    fn pdo_category(direction: PdoDirection, index: u16) -> Category {
        Category::new(CategoryData::Pdo(PdoCategory {
            direction,
            pdos: vec![Pdo {
                index,
                ..Default::default()
            }],
        }))
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut model = CategoryModel::default();
        let a = model.append_category(Category::opaque(0x0800, vec![]));
        let b = model.append_category(Category::opaque(0x0801, vec![]));
        assert_ne!(a, b);
        assert!(model.remove_category(b).is_some());
        let c = model.append_category(Category::opaque(0x0802, vec![]));
        assert_ne!(b, c);
        assert!(model.category(b).is_none());
        assert_eq!(model.position(c), Some(1));
        assert!(model.remove_category(b).is_none());
    }

    #[test]
    fn test_categories_of_type_is_restartable() {
        let mut model = CategoryModel::default();
        model.append_category(pdo_category(PdoDirection::Tx, 0x1A00));
        model.append_category(pdo_category(PdoDirection::Rx, 0x1600));
        model.append_category(pdo_category(PdoDirection::Tx, 0x1A01));

        let ids = |model: &CategoryModel| -> Vec<_> {
            model.categories_of_type(CategoryType::TxPdo).map(|c| c.id()).collect()
        };
        let first = ids(&model);
        let second = ids(&model);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(model.pdos(PdoDirection::Rx).count(), 1);
    }

    #[test]
    fn test_add_string_interns() {
        let mut model = CategoryModel::default();
        model.append_category(Category::new(CategoryData::General(General::default())));
        assert_eq!(model.add_string("").unwrap(), 0);
        assert_eq!(model.add_string("EL1008").unwrap(), 1);
        assert_eq!(model.add_string("Digital In").unwrap(), 2);
        assert_eq!(model.add_string("EL1008").unwrap(), 1);
        // Strings category was created in front of General.
        assert_eq!(model.categories()[0].kind(), CategoryType::Strings);
        assert_eq!(model.string_at(2), Some("Digital In"));
        assert_eq!(model.string_at(0), None);
        assert_eq!(model.string_at(3), None);
    }

    #[test]
    fn test_append_clears_declared_size() {
        let mut model = CategoryModel::default();
        let mut category = Category::opaque(0x0800, vec![1, 2]);
        category.declared_size = Some(9);
        let id = model.append_category(category);
        assert_eq!(model.category(id).unwrap().declared_size, None);
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CategoryModel>();
    }
}
