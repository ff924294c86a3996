use crate::schema::keywords;

/// Mapping from the seven semantic roles to actual column names.
///
/// Built once from the dataset headers and immutable afterward. A role
/// with no matching header stays `None`; detection never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub product: Option<String>,
    pub customer: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
}

impl ColumnMap {
    /// Detect semantic columns by case-insensitive substring match.
    ///
    /// For each role the keyword list is scanned in order, and for each
    /// keyword the headers in dataset order; the first hit fixes the
    /// mapping for that role (first match wins).
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            date: first_match(headers, &keywords::DATE),
            price: first_match(headers, &keywords::PRICE),
            quantity: first_match(headers, &keywords::QUANTITY),
            product: first_match(headers, &keywords::PRODUCT),
            customer: first_match(headers, &keywords::CUSTOMER),
            city: first_match(headers, &keywords::CITY),
            category: first_match(headers, &keywords::CATEGORY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.product.is_none()
            && self.customer.is_none()
            && self.city.is_none()
            && self.category.is_none()
    }

    /// Human-readable `role -> column` listing for logging.
    pub fn describe(&self) -> String {
        let pairs = [
            ("date", &self.date),
            ("price", &self.price),
            ("quantity", &self.quantity),
            ("product", &self.product),
            ("customer", &self.customer),
            ("city", &self.city),
            ("category", &self.category),
        ];
        let parts: Vec<String> = pairs
            .iter()
            .filter_map(|(role, col)| col.as_ref().map(|c| format!("{role} -> {c}")))
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn first_match<S: AsRef<str>>(headers: &[S], words: &[&str]) -> Option<String> {
    for word in words {
        for header in headers {
            if header.as_ref().to_lowercase().contains(word) {
                return Some(header.as_ref().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_typical_sales_headers() {
        let headers = ["Order Date", "Item", "Qty", "Unit Price", "City"];
        let map = ColumnMap::detect(&headers);

        assert_eq!(map.date.as_deref(), Some("Order Date"));
        assert_eq!(map.product.as_deref(), Some("Item"));
        assert_eq!(map.quantity.as_deref(), Some("Qty"));
        assert_eq!(map.price.as_deref(), Some("Unit Price"));
        assert_eq!(map.city.as_deref(), Some("City"));
        assert_eq!(map.customer, None);
        assert_eq!(map.category, None);
    }

    #[test]
    fn unrecognizable_headers_yield_empty_map() {
        let headers = ["alpha", "beta", "gamma"];
        let map = ColumnMap::detect(&headers);
        assert!(map.is_empty());
    }

    #[test]
    fn empty_header_set_yields_empty_map() {
        let map = ColumnMap::detect::<&str>(&[]);
        assert!(map.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let map = ColumnMap::detect(&["PRODUCT_NAME", "TOTAL_AMOUNT"]);
        assert_eq!(map.product.as_deref(), Some("PRODUCT_NAME"));
        assert_eq!(map.price.as_deref(), Some("TOTAL_AMOUNT"));
    }

    #[test]
    fn first_listed_keyword_wins_over_later_ones() {
        // "price" precedes "amount" in the keyword list, so the price
        // role maps to the price column even though both headers match.
        let map = ColumnMap::detect(&["Discount Amount", "List Price"]);
        assert_eq!(map.price.as_deref(), Some("List Price"));
    }

    #[test]
    fn header_order_breaks_ties_within_one_keyword() {
        let map = ColumnMap::detect(&["price_a", "price_b"]);
        assert_eq!(map.price.as_deref(), Some("price_a"));
    }

    #[test]
    fn never_maps_without_a_keyword_hit() {
        let headers = ["Order Date", "Widget", "Qty"];
        let map = ColumnMap::detect(&headers);
        for (col, words) in [
            (&map.date, &keywords::DATE[..]),
            (&map.price, &keywords::PRICE[..]),
            (&map.quantity, &keywords::QUANTITY[..]),
            (&map.product, &keywords::PRODUCT[..]),
            (&map.customer, &keywords::CUSTOMER[..]),
            (&map.city, &keywords::CITY[..]),
            (&map.category, &keywords::CATEGORY[..]),
        ] {
            if let Some(name) = col {
                let lower = name.to_lowercase();
                assert!(words.iter().any(|w| lower.contains(w)));
            }
        }
    }

    #[test]
    fn describe_lists_only_mapped_roles() {
        let map = ColumnMap::detect(&["Order Date", "City"]);
        let text = map.describe();
        assert!(text.contains("date -> Order Date"));
        assert!(text.contains("city -> City"));
        assert!(!text.contains("product"));
    }
}
