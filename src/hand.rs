use crate::deck::HandItem;

/// The player's held items: an ordered, capacity-bounded collection with a
/// selection cursor that always points at a valid index (or 0 when empty).
pub struct PlayerHand {
    items: Vec<HandItem>,
    max_items: usize,
    selected: usize,
}

impl PlayerHand {
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            max_items,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn items(&self) -> &[HandItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&HandItem> {
        self.items.get(index)
    }

    pub fn add_item(&mut self, item: HandItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.clamp_selection();
        true
    }

    /// Shrink (or grow) the capacity, dropping trailing items that no
    /// longer fit.
    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
        if self.items.len() > max_items {
            self.items.truncate(max_items);
        }
        self.clamp_selection();
    }

    pub fn select_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&HandItem> {
        self.items.get(self.selected)
    }

    /// Rotate the selected item in place.
    pub fn rotate_selected(&mut self) -> bool {
        match self.items.get_mut(self.selected) {
            Some(HandItem::Block(block)) => {
                block.rotate();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len() - 1;
        }
    }
}
