/// Position of the loaded history relative to the server's page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    current_page: u32,
    last_page: u32,
}

impl PaginationCursor {
    /// Builds a cursor, clamping `current_page` into `1..=last_page`.
    pub fn new(current_page: u32, last_page: u32) -> Self {
        let last_page = last_page.max(1);
        Self {
            current_page: current_page.clamp(1, last_page),
            last_page,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn can_load_more(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn next_page(&self) -> Option<u32> {
        self.can_load_more().then(|| self.current_page + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_is_available_until_last_page() {
        let cursor = PaginationCursor::new(1, 3);

        assert!(cursor.can_load_more());
        assert_eq!(cursor.next_page(), Some(2));
    }

    #[test]
    fn last_page_has_no_next_page() {
        let cursor = PaginationCursor::new(3, 3);

        assert!(!cursor.can_load_more());
        assert_eq!(cursor.next_page(), None);
    }

    #[test]
    fn clamps_current_page_beyond_last_page() {
        let cursor = PaginationCursor::new(7, 3);

        assert_eq!(cursor.current_page(), 3);
    }

    #[test]
    fn treats_zero_last_page_as_single_page() {
        let cursor = PaginationCursor::new(1, 0);

        assert_eq!(cursor.last_page(), 1);
        assert!(!cursor.can_load_more());
    }
}
