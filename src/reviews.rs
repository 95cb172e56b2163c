use std::sync::Arc;

use crate::catalog::Review;

pub const DEFAULT_PAGE_SIZE: usize = 2;

// ceil(len / size), never below 1 so an empty list still reads "Page 1 / 1"
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    ((len + page_size - 1) / page_size).max(1)
}

// 1-based; out of range pages are empty
pub fn page(reviews: &[Review], page_index: usize, page_size: usize) -> &[Review] {
    let page_size = page_size.max(1);
    if page_index == 0 {
        return &[];
    }

    let start = (page_index - 1).saturating_mul(page_size).min(reviews.len());
    let end = start.saturating_add(page_size).min(reviews.len());
    &reviews[start..end]
}

#[derive(Debug, Clone)]
pub struct ReviewPager {
    reviews: Arc<[Review]>,
    page_size: usize,
    page: usize,
}

impl ReviewPager {
    pub fn new(reviews: Arc<[Review]>, page_size: usize) -> Self {
        Self {
            reviews,
            page_size: page_size.max(1),
            page: 1,
        }
    }

    // A different list (by identity) always starts over at page 1
    pub fn set_reviews(&mut self, reviews: Arc<[Review]>) {
        if !Arc::ptr_eq(&self.reviews, &reviews) {
            self.reviews = reviews;
            self.page = 1;
        }
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.reviews.len(), self.page_size)
    }

    pub fn current(&self) -> &[Review] {
        page(&self.reviews, self.page, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next(&mut self) -> usize {
        self.page = (self.page + 1).min(self.total_pages());
        self.page
    }

    pub fn prev(&mut self) -> usize {
        self.page = self.page.saturating_sub(1).max(1);
        self.page
    }

    pub fn label(&self) -> String {
        format!("Page {} / {}", self.page, self.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviews(n: u32) -> Arc<[Review]> {
        (1..=n)
            .map(|id| Review {
                id,
                user: format!("user{}", id),
                text: format!("review {}", id),
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_five_reviews_in_pages_of_two() {
        let list = reviews(5);
        assert_eq!(total_pages(list.len(), 2), 3);
        assert_eq!(page(&list, 1, 2).len(), 2);
        assert_eq!(page(&list, 2, 2)[0].id, 3);
        assert_eq!(page(&list, 3, 2).len(), 1);
        assert!(page(&list, 4, 2).is_empty());
        assert!(page(&list, 0, 2).is_empty());
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let pager = ReviewPager::new(reviews(0), DEFAULT_PAGE_SIZE);
        assert_eq!(pager.total_pages(), 1);
        assert!(pager.current().is_empty());
        assert!(!pager.has_prev());
        assert!(!pager.has_next());
        assert_eq!(pager.label(), "Page 1 / 1");
    }

    #[test]
    fn test_navigation_clamps_at_ends() {
        let mut pager = ReviewPager::new(reviews(4), DEFAULT_PAGE_SIZE);
        assert!(!pager.has_prev());
        assert!(pager.has_next());

        assert_eq!(pager.next(), 2);
        assert!(!pager.has_next());
        assert_eq!(pager.next(), 2);
        assert_eq!(pager.current()[1].id, 4);

        assert_eq!(pager.prev(), 1);
        assert_eq!(pager.prev(), 1);
    }

    #[test]
    fn test_new_list_resets_page() {
        let first = reviews(5);
        let mut pager = ReviewPager::new(first.clone(), DEFAULT_PAGE_SIZE);
        pager.next();
        pager.next();
        assert_eq!(pager.page_index(), 3);

        // same list, same page
        pager.set_reviews(first);
        assert_eq!(pager.page_index(), 3);

        // equal contents but a different list still resets
        pager.set_reviews(reviews(5));
        assert_eq!(pager.page_index(), 1);
        assert_eq!(pager.current()[0].id, 1);
    }
}
