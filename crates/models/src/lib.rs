//! Persistent record models for the customer and inventory services.
//! - sea-orm entity definitions
//! - field validators shared by the service layer
//! - connection and table bootstrap helpers

pub mod errors;
pub mod db;
pub mod schema;
pub mod customer;
pub mod product;

/// Treat blank strings as absent. Unique columns store NULL instead of `""`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn blank_values_become_none() {
        assert_eq!(non_blank(Some("".into())), None);
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("a@b.c".into())), Some("a@b.c".to_string()));
    }
}
