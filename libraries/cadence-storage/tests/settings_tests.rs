
use cadence_core::settings::{SETTING_ALBUM_SORT, SETTING_KEEP_SHUFFLE};
use cadence_storage::settings;
use serde_json::json;
use test_helpers::TestDb;

#[tokio::test]
async fn test_set_and_get_setting() {
    let db = TestDb::new().await;

    let value = json!(false);
    settings::set_setting(db.pool(), SETTING_KEEP_SHUFFLE, &value)
        .await
        .unwrap();

    let result = settings::get_setting(db.pool(), SETTING_KEEP_SHUFFLE)
        .await
        .unwrap();
    assert_eq!(result, Some(value));
}

#[tokio::test]
async fn test_get_non_existent_setting() {
    let db = TestDb::new().await;

    let result = settings::get_setting(db.pool(), "non_existent_key")
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_update_existing_setting() {
    let db = TestDb::new().await;

    settings::set_setting(db.pool(), SETTING_ALBUM_SORT, &json!("numeric_ascending"))
        .await
        .unwrap();
    settings::set_setting(db.pool(), SETTING_ALBUM_SORT, &json!("alphabetic_descending"))
        .await
        .unwrap();

    let result = settings::get_setting(db.pool(), SETTING_ALBUM_SORT)
        .await
        .unwrap();
    assert_eq!(result, Some(json!("alphabetic_descending")));

    let all = settings::get_all_settings(db.pool()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_get_all_settings_is_ordered_by_key() {
    let db = TestDb::new().await;

    settings::set_setting(db.pool(), "b.second", &json!(2)).await.unwrap();
    settings::set_setting(db.pool(), "a.first", &json!({"nested": [1, 2]}))
        .await
        .unwrap();

    let all = settings::get_all_settings(db.pool()).await.unwrap();
    let keys: Vec<&str> = all.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["a.first", "b.second"]);
    assert_eq!(all[0].value, json!({"nested": [1, 2]}));
}

#[tokio::test]
async fn test_delete_setting() {
    let db = TestDb::new().await;

    settings::set_setting(db.pool(), SETTING_KEEP_SHUFFLE, &json!(true))
        .await
        .unwrap();
    assert!(settings::delete_setting(db.pool(), SETTING_KEEP_SHUFFLE).await.unwrap());
    assert!(!settings::delete_setting(db.pool(), SETTING_KEEP_SHUFFLE).await.unwrap());
    assert_eq!(
        settings::get_setting(db.pool(), SETTING_KEEP_SHUFFLE).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_corrupt_value_is_an_error() {
    let db = TestDb::new().await;

    sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES ('broken', '{not json', 0)")
        .execute(db.pool())
        .await
        .unwrap();

    assert!(settings::get_setting(db.pool(), "broken").await.is_err());
}
