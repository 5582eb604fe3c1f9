use serde_json::json;
use uuid::Uuid;

use vitrine_core::resource::{PROJECTS, SHOP_CATEGORIES, STATISTICS, TEAM, TICKER};

use crate::common::setup_test_db;

#[tokio::test]
async fn list_orders_by_display_order() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&PROJECTS);

    for (title, order) in [("Third", 3), ("First", 1), ("Second", 2)] {
        let record = PROJECTS
            .new_record(&json!({"title": title, "displayOrder": order}))
            .unwrap();
        repo.create(record).await.unwrap();
    }

    let projects = repo.list().await.unwrap();
    let orders: Vec<i64> = projects
        .iter()
        .map(|p| p["displayOrder"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(projects[0]["title"], "First");
}

#[tokio::test]
async fn equal_display_order_keeps_insertion_order() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&TICKER);

    for text in ["alpha", "beta", "gamma"] {
        let record = TICKER.new_record(&json!({"text": text})).unwrap();
        repo.create(record).await.unwrap();
    }

    let items = repo.list().await.unwrap();
    let texts: Vec<&str> = items.iter().map(|i| i["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn create_returns_id_and_get_uses_camel_case() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&PROJECTS);

    let record = PROJECTS
        .new_record(&json!({
            "title": "Harbour",
            "imageUrl": "https://cdn.example.com/h.jpg",
            "description": "<p onclick=\"x()\">Pier</p>"
        }))
        .unwrap();
    let id = repo.create(record).await.unwrap();

    let project = repo.get(id).await.unwrap().expect("project exists");
    assert_eq!(project["id"], id.to_string());
    assert_eq!(project["imageUrl"], "https://cdn.example.com/h.jpg");
    assert_eq!(project["description"], "<p>Pier</p>");
    assert_eq!(project["link"], serde_json::Value::Null);
    assert!(project.get("createdAt").is_some());
}

#[tokio::test]
async fn shop_category_default_name_persisted() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&SHOP_CATEGORIES);

    let record = SHOP_CATEGORIES.new_record(&json!({"name": ""})).unwrap();
    let id = repo.create(record).await.unwrap();

    let category = repo.get(id).await.unwrap().unwrap();
    assert_eq!(category["name"], "New Category");
    assert_eq!(category["displayOrder"], 0);
}

#[tokio::test]
async fn partial_update_touches_only_given_fields() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&STATISTICS);

    let record = STATISTICS
        .new_record(&json!({"label": "Projects", "value": "120", "suffix": "+"}))
        .unwrap();
    let id = repo.create(record).await.unwrap();

    let changes = STATISTICS.changes(&json!({"value": "150"})).unwrap();
    assert!(repo.update(id, changes).await.unwrap());

    let stat = repo.get(id).await.unwrap().unwrap();
    assert_eq!(stat["value"], "150");
    assert_eq!(stat["label"], "Projects");
    assert_eq!(stat["suffix"], "+");
}

#[tokio::test]
async fn update_unknown_id_returns_false() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&TEAM);

    let changes = TEAM.changes(&json!({"position": "Lead"})).unwrap();
    assert!(!repo.update(Uuid::new_v4(), changes).await.unwrap());
}

#[tokio::test]
async fn delete_removes_record() {
    let (db, _container) = setup_test_db().await;
    let repo = db.content_repo(&TICKER);

    let id = repo
        .create(TICKER.new_record(&json!({"text": "bye"})).unwrap())
        .await
        .unwrap();

    assert_eq!(repo.delete(id).await.unwrap(), 1);
    assert!(repo.get(id).await.unwrap().is_none());
    assert_eq!(repo.delete(id).await.unwrap(), 0);
}
