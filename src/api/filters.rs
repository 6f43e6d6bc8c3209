//! Query-string filters for list endpoints.
//!
//! Each filter is a plain struct listing the parameters it recognizes.
//! Anything else in the query string is ignored.

use crate::api::pagination::parse_page;
use crate::api::validation::{FieldErrors, Validator};
use crate::db::RecipeQuery;

/// Recognized parameters of `GET /recipes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    pub tags: Vec<String>,
    pub author: Option<i32>,
    pub page: u64,
}

impl RecipeFilter {
    pub fn from_query(raw: Option<&str>) -> Result<Self, FieldErrors> {
        let mut filter = Self {
            page: 1,
            ..Self::default()
        };
        let mut validator = Validator::new();
        let mut page_raw = None;

        for (key, value) in pairs(raw) {
            match key.as_str() {
                "is_favorited" => match parse_bool(&value) {
                    Ok(v) => filter.is_favorited = Some(v),
                    Err(e) => validator.add("is_favorited", e),
                },
                "is_in_shopping_cart" => match parse_bool(&value) {
                    Ok(v) => filter.is_in_shopping_cart = Some(v),
                    Err(e) => validator.add("is_in_shopping_cart", e),
                },
                "tags" => {
                    if !value.is_empty() {
                        filter.tags.push(value);
                    }
                }
                "author" => match value.trim().parse::<i32>() {
                    Ok(id) => filter.author = Some(id),
                    Err(_) => validator.add("author", format!("Invalid author id: '{value}'")),
                },
                "page" => page_raw = Some(value),
                _ => {}
            }
        }

        match parse_page(page_raw.as_deref()) {
            Ok(page) => filter.page = page,
            Err(e) => validator.add("page", e),
        }

        validator.finish()?;
        Ok(filter)
    }

    /// Resolves the filter against the requester. The two relation flags
    /// only narrow the listing for an authenticated requester asking for
    /// `true`; every other combination leaves the listing unrestricted.
    #[must_use]
    pub fn to_query(&self, viewer_id: Option<i32>) -> RecipeQuery {
        let relation = |flag: Option<bool>| match (flag, viewer_id) {
            (Some(true), Some(id)) => Some(id),
            _ => None,
        };

        RecipeQuery {
            author_id: self.author,
            favorited_by: relation(self.is_favorited),
            in_cart_of: relation(self.is_in_shopping_cart),
            tag_slugs: self.tags.clone(),
        }
    }
}

/// Recognized parameters of `GET /ingredients`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientFilter {
    pub name: Option<String>,
}

impl IngredientFilter {
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        let name = pairs(raw)
            .into_iter()
            .find(|(key, _)| key == "name")
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty());

        Self { name }
    }
}

/// `page` of the other paginated lists
pub fn page_from_query(raw: Option<&str>) -> Result<u64, FieldErrors> {
    let page_raw = pairs(raw)
        .into_iter()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value);

    parse_page(page_raw.as_deref())
        .map_err(|e| FieldErrors::from([("page".to_string(), vec![e])]))
}

fn pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(format!("Invalid boolean: '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_filter_parses_all_params() {
        let filter = RecipeFilter::from_query(Some(
            "is_favorited=1&is_in_shopping_cart=false&tags=lunch&tags=Dinner&author=7&page=2&limit=6",
        ))
        .unwrap();

        assert_eq!(filter.is_favorited, Some(true));
        assert_eq!(filter.is_in_shopping_cart, Some(false));
        assert_eq!(filter.tags, vec!["lunch", "Dinner"]);
        assert_eq!(filter.author, Some(7));
        assert_eq!(filter.page, 2);
    }

    #[test]
    fn test_recipe_filter_defaults() {
        let filter = RecipeFilter::from_query(None).unwrap();
        assert_eq!(filter.page, 1);
        assert!(filter.tags.is_empty());
        assert_eq!(filter.to_query(Some(1)).favorited_by, None);
    }

    #[test]
    fn test_recipe_filter_rejects_malformed_values() {
        let errors =
            RecipeFilter::from_query(Some("is_favorited=maybe&author=abc&page=0")).unwrap_err();
        assert!(errors.contains_key("is_favorited"));
        assert!(errors.contains_key("author"));
        assert!(errors.contains_key("page"));
    }

    #[test]
    fn test_anonymous_relation_flags_are_ignored() {
        let filter =
            RecipeFilter::from_query(Some("is_favorited=true&is_in_shopping_cart=1")).unwrap();

        let anonymous = filter.to_query(None);
        assert_eq!(anonymous.favorited_by, None);
        assert_eq!(anonymous.in_cart_of, None);

        let signed_in = filter.to_query(Some(4));
        assert_eq!(signed_in.favorited_by, Some(4));
        assert_eq!(signed_in.in_cart_of, Some(4));
    }

    #[test]
    fn test_ingredient_filter() {
        assert_eq!(
            IngredientFilter::from_query(Some("name=%D1%81%D0%BE%D0%BB%D1%8C")).name,
            Some("соль".to_string())
        );
        assert_eq!(IngredientFilter::from_query(Some("name=")).name, None);
        assert_eq!(IngredientFilter::from_query(None).name, None);
    }

    #[test]
    fn test_page_from_query() {
        assert_eq!(page_from_query(Some("page=4")).unwrap(), 4);
        assert_eq!(page_from_query(None).unwrap(), 1);
        assert!(page_from_query(Some("page=x")).is_err());
    }
}
