//! Unit tests for the SqlBuilder query construction.

use duckdb::types::Value;
use ygo_collection::SqlBuilder;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("user_cards").build();
    assert_eq!(sql, "SELECT *\nFROM user_cards");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("user_cards")
        .select(&["id", "name"])
        .build();
    assert!(sql.starts_with("SELECT id, name\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_binds_text_and_numbers() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_eq("user_id", "duelist")
        .where_eq("quantity", 3u32)
        .build();
    assert!(sql.contains("WHERE user_id = ? AND quantity = ?"));
    assert_eq!(params, vec![text("duelist"), Value::BigInt(3)]);
}

#[test]
fn where_eq_with_none_binds_null() {
    let (_, params) = SqlBuilder::new("user_cards")
        .where_eq("rarity", None::<&str>)
        .build();
    assert_eq!(params, vec![Value::Null]);
}

#[test]
fn where_like_adds_case_insensitive_like() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_like("name", "%dragon%")
        .build();
    assert!(sql.contains("LOWER(name) LIKE LOWER(?)"));
    assert_eq!(params, vec![text("%dragon%")]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_in("id", &["a", "b", "c"])
        .build();
    assert!(sql.contains("id IN (?, ?, ?)"));
    assert_eq!(params, vec![text("a"), text("b"), text("c")]);
}

#[test]
fn where_in_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_in("id", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn range_bounds_bind_integers() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_gte("atk", 1500i64)
        .where_lte("atk", 2500i64)
        .build();
    assert!(sql.contains("atk >= ? AND atk <= ?"));
    assert_eq!(params, vec![Value::BigInt(1500), Value::BigInt(2500)]);
}

#[test]
fn where_any_like_groups_columns_with_or() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_any_like(&["name", "description"], "%draw%")
        .build();
    assert!(sql.contains("(LOWER(name) LIKE LOWER(?) OR LOWER(description) LIKE LOWER(?))"));
    assert_eq!(params, vec![text("%draw%"), text("%draw%")]);
}

#[test]
fn where_any_like_without_columns_is_noop() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_any_like(&[], "%draw%")
        .build();
    assert!(!sql.contains("WHERE"));
    assert!(params.is_empty());
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_eq("user_id", "duelist")
        .where_clause("quantity BETWEEN ? AND ?", vec![Value::BigInt(1), Value::BigInt(3)])
        .build();
    assert!(sql.contains("quantity BETWEEN ? AND ?"));
    assert_eq!(params, vec![text("duelist"), Value::BigInt(1), Value::BigInt(3)]);
}

// ---------------------------------------------------------------------------
// GROUP BY / ORDER BY / paging
// ---------------------------------------------------------------------------

#[test]
fn group_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("user_cards")
        .select(&["rarity", "SUM(quantity) AS owned"])
        .group_by(&["rarity"])
        .build();
    assert!(sql.contains("GROUP BY rarity"));
}

#[test]
fn order_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("user_cards")
        .order_by(&["created_at DESC", "name ASC"])
        .build();
    assert!(sql.contains("ORDER BY created_at DESC, name ASC"));
}

#[test]
fn limit_and_offset_together() {
    let (sql, _) = SqlBuilder::new("user_cards")
        .limit(48)
        .offset(96)
        .build();
    assert!(sql.ends_with("LIMIT 48\nOFFSET 96"));
}

// ---------------------------------------------------------------------------
// Combined
// ---------------------------------------------------------------------------

#[test]
fn combined_builder_chains_correctly() {
    let (sql, params) = SqlBuilder::new("user_cards")
        .where_eq("user_id", "duelist")
        .where_any_like(&["name", "set_name"], "%eyes%")
        .where_gte("level_rank_link", 4u32)
        .order_by(&["name ASC"])
        .limit(48)
        .offset(0)
        .build();

    assert_eq!(
        sql,
        "SELECT *\nFROM user_cards\n\
         WHERE user_id = ? AND (LOWER(name) LIKE LOWER(?) OR LOWER(set_name) LIKE LOWER(?)) \
         AND level_rank_link >= ?\n\
         ORDER BY name ASC\nLIMIT 48\nOFFSET 0"
    );
    assert_eq!(params.len(), 4);
    assert_eq!(params[0], text("duelist"));
    assert_eq!(params[3], Value::BigInt(4));
}

#[test]
fn built_query_runs_against_the_store() {
    let conn = ygo_collection::Connection::open_in_memory().unwrap();
    let (sql, params) = SqlBuilder::new("user_cards")
        .select(&["COUNT(*) AS n"])
        .where_eq("user_id", "nobody")
        .build();
    let rows = conn.execute(&sql, &params).unwrap();
    assert_eq!(rows[0]["n"], serde_json::json!(0));
}
