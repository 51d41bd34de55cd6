//! End-to-end scenarios against a real Postgres.
//!
//! Run with `DATABASE_URL` pointing at a server where the test user may
//! create databases: `cargo test -- --ignored`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use common::{body_json, build_test_app, delete, get, patch_json, post_json};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use gestion_pro::db::{ProjectRepo, TaskRepo};

async fn create(pool: &PgPool, uri: &str, body: Value) -> Value {
    let response = post_json(build_test_app(pool.clone()), uri, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", uri);
    body_json(response).await
}

async fn list(pool: &PgPool, uri: &str) -> Vec<Value> {
    let response = get(build_test_app(pool.clone()), uri).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    body_json(response).await.as_array().cloned().unwrap_or_default()
}

async fn project_progress(pool: &PgPool, id: &Value) -> i64 {
    list(pool, "/api/projects")
        .await
        .into_iter()
        .find(|p| &p["id"] == id)
        .and_then(|p| p["progress"].as_i64())
        .expect("project listed")
}

// ---------------------------------------------------------------------------
// Progress rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn finishing_a_project_completes_its_tasks(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Refonte", "progress": "20" })).await;
    assert_eq!(project["progress"], 20);
    assert_eq!(project["status"], "En cours");

    for title in ["Maquette", "Intégration"] {
        create(&pool, "/api/tasks", json!({ "title": title, "projectId": project["id"] })).await;
    }

    let uri = format!("/api/projects/{}", project["id"]);
    let response = patch_json(build_test_app(pool.clone()), &uri, json!({ "status": "Terminé" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["progress"], 100);
    assert_eq!(updated["status"], "Terminé");
    assert!(updated["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["completed"] == true));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn creating_a_finished_project_stores_full_progress(pool: PgPool) {
    let project = create(
        &pool,
        "/api/projects",
        json!({ "name": "Audit", "status": "Terminé", "progress": 40 }),
    )
    .await;
    assert_eq!(project["progress"], 100);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn toggling_tasks_recomputes_progress(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Boutique" })).await;

    let mut tasks = Vec::new();
    for i in 0..4 {
        let task = create(
            &pool,
            "/api/tasks",
            json!({ "title": format!("Tâche {}", i), "projectId": project["id"].to_string() }),
        )
        .await;
        tasks.push(task);
    }

    let app = build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/tasks/{}", tasks[0]["id"]),
        json!({ "completed": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(project_progress(&pool, &project["id"]).await, 25);

    patch_json(
        build_test_app(pool.clone()),
        &format!("/api/tasks/{}", tasks[1]["id"]),
        json!({ "completed": true }),
    )
    .await;
    assert_eq!(project_progress(&pool, &project["id"]).await, 50);

    patch_json(
        build_test_app(pool.clone()),
        &format!("/api/tasks/{}", tasks[0]["id"]),
        json!({ "completed": false }),
    )
    .await;
    assert_eq!(project_progress(&pool, &project["id"]).await, 25);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn editing_a_task_without_completed_keeps_progress(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Blog", "progress": 70 })).await;
    let task = create(&pool, "/api/tasks", json!({ "title": "Textes", "projectId": project["id"] })).await;

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/tasks/{}", task["id"]),
        json!({ "title": "Textes finaux", "priority": "Haute" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Textes finaux");
    assert_eq!(updated["priority"], "Haute");

    assert_eq!(project_progress(&pool, &project["id"]).await, 70);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn deleting_a_task_leaves_progress_untouched(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Appli" })).await;
    let done = create(&pool, "/api/tasks", json!({ "title": "A", "projectId": project["id"] })).await;
    let open = create(&pool, "/api/tasks", json!({ "title": "B", "projectId": project["id"] })).await;

    patch_json(
        build_test_app(pool.clone()),
        &format!("/api/tasks/{}", done["id"]),
        json!({ "completed": true }),
    )
    .await;
    assert_eq!(project_progress(&pool, &project["id"]).await, 50);

    let response = delete(build_test_app(pool.clone()), &format!("/api/tasks/{}", open["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Tâche supprimée");

    assert_eq!(project_progress(&pool, &project["id"]).await, 50);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn concurrent_toggles_in_one_project_count_every_task(pool: PgPool) {
    for round in 0..10 {
        let project = create(&pool, "/api/projects", json!({ "name": format!("Lot {}", round) })).await;
        let mut tasks = Vec::new();
        for i in 0..4 {
            let task = create(
                &pool,
                "/api/tasks",
                json!({ "title": format!("T{}", i), "projectId": project["id"] }),
            )
            .await;
            tasks.push(task);
        }

        let first = format!("/api/tasks/{}", tasks[0]["id"]);
        let second = format!("/api/tasks/{}", tasks[1]["id"]);
        let (a, b) = tokio::join!(
            patch_json(build_test_app(pool.clone()), &first, json!({ "completed": true })),
            patch_json(build_test_app(pool.clone()), &second, json!({ "completed": true })),
        );
        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);

        assert_eq!(project_progress(&pool, &project["id"]).await, 50, "round {}", round);
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn patching_a_finished_status_overrides_supplied_progress(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Catalogue" })).await;
    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/projects/{}", project["id"]),
        json!({ "status": "Terminé", "progress": 30 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["progress"], 100);
    assert_eq!(project_progress(&pool, &project["id"]).await, 100);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn patching_progress_alone_stores_it(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Newsletter", "progress": 10 })).await;
    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/projects/{}", project["id"]),
        json!({ "progress": "60" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["progress"], 60);
    assert_eq!(updated["status"], "En cours");
    assert_eq!(updated["name"], "Newsletter");
}

// ---------------------------------------------------------------------------
// Clearing optional fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn null_clears_project_description_client_and_deadline(pool: PgPool) {
    let client = create(&pool, "/api/clients", json!({ "name": "Mairie" })).await;
    let project = create(
        &pool,
        "/api/projects",
        json!({
            "name": "Affiches",
            "description": "Campagne été",
            "clientId": client["id"],
            "deadline": "2025-07-01"
        }),
    )
    .await;
    assert_eq!(project["description"], "Campagne été");
    assert_eq!(project["clientId"], client["id"]);
    assert!(!project["deadline"].is_null());

    let uri = format!("/api/projects/{}", project["id"]);
    let response = patch_json(
        build_test_app(pool.clone()),
        &uri,
        json!({ "description": null, "clientId": null, "deadline": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert!(updated["description"].is_null());
    assert!(updated["clientId"].is_null());
    assert!(updated["client"].is_null());
    assert!(updated["deadline"].is_null());
    assert_eq!(updated["name"], "Affiches");

    // An empty clientId clears as well
    let response = patch_json(
        build_test_app(pool.clone()),
        &uri,
        json!({ "clientId": client["id"].to_string() }),
    )
    .await;
    assert_eq!(body_json(response).await["clientId"], client["id"]);
    let response = patch_json(build_test_app(pool.clone()), &uri, json!({ "clientId": "" })).await;
    assert!(body_json(response).await["clientId"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn null_clears_task_description_only_when_sent(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Vitrine" })).await;
    let task = create(
        &pool,
        "/api/tasks",
        json!({ "title": "Photos", "description": "Shooting", "projectId": project["id"] }),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let response = patch_json(build_test_app(pool.clone()), &uri, json!({ "title": "Photos HD" })).await;
    assert_eq!(body_json(response).await["description"], "Shooting");

    let response = patch_json(build_test_app(pool.clone()), &uri, json!({ "description": null })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Photos HD");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn null_clears_contact_fields(pool: PgPool) {
    let client = create(
        &pool,
        "/api/clients",
        json!({ "name": "Garage Leroy", "email": "leroy@garage.fr", "phone": "0600000000" }),
    )
    .await;
    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/clients/{}", client["id"]),
        json!({ "email": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert!(updated["email"].is_null());
    assert_eq!(updated["phone"], "0600000000");

    let supplier = create(
        &pool,
        "/api/suppliers",
        json!({ "name": "Imprimerie Roux", "category": "Impression" }),
    )
    .await;
    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/suppliers/{}", supplier["id"]),
        json!({ "category": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert!(updated["category"].is_null());
    assert_eq!(updated["name"], "Imprimerie Roux");

    let user = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    let profile = format!("/api/user/{}/profile", user["id"]);
    let response = patch_json(build_test_app(pool.clone()), &profile, json!({ "phone": "0700000000" })).await;
    assert_eq!(body_json(response).await["phone"], "0700000000");
    let response = patch_json(build_test_app(pool.clone()), &profile, json!({ "phone": null })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["phone"].is_null());
}

// ---------------------------------------------------------------------------
// Cascades and lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn deleting_a_client_removes_its_projects_and_tasks(pool: PgPool) {
    let client = create(&pool, "/api/clients", json!({ "name": "Boulangerie Martin" })).await;
    let project = create(
        &pool,
        "/api/projects",
        json!({ "name": "Site", "clientId": client["id"].to_string() }),
    )
    .await;
    assert_eq!(project["client"]["name"], "Boulangerie Martin");
    create(&pool, "/api/tasks", json!({ "title": "Logo", "projectId": project["id"] })).await;

    let clients = list(&pool, "/api/clients").await;
    assert_eq!(clients[0]["projects"].as_array().unwrap().len(), 1);

    let response = delete(build_test_app(pool.clone()), &format!("/api/clients/{}", client["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Client supprimé");

    assert!(list(&pool, "/api/clients").await.is_empty());
    assert!(list(&pool, "/api/projects").await.is_empty());
    assert!(list(&pool, "/api/tasks").await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn deleting_a_project_removes_its_tasks(pool: PgPool) {
    let keep = create(&pool, "/api/projects", json!({ "name": "Garde" })).await;
    let drop = create(&pool, "/api/projects", json!({ "name": "Abandon" })).await;
    create(&pool, "/api/tasks", json!({ "title": "Reste", "projectId": keep["id"] })).await;
    create(&pool, "/api/tasks", json!({ "title": "Part", "projectId": drop["id"] })).await;

    let response = delete(build_test_app(pool.clone()), &format!("/api/projects/{}", drop["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Projet supprimé");

    let tasks = list(&pool, "/api/tasks").await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Reste");
    assert_eq!(tasks[0]["project"]["name"], "Garde");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn missing_records_are_404(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = patch_json(app, "/api/projects/9999", json!({ "name": "Fantôme" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(build_test_app(pool.clone()), "/api/suppliers/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(build_test_app(pool.clone()), "/api/user/9999/settings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn task_for_unknown_project_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/tasks",
        json!({ "title": "Orpheline", "projectId": 9999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn suppliers_crud(pool: PgPool) {
    let supplier = create(
        &pool,
        "/api/suppliers",
        json!({ "name": "Papeterie Dupont", "email": "contact@dupont.fr" }),
    )
    .await;

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/suppliers/{}", supplier["id"]),
        json!({ "phone": "0102030405" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["phone"], "0102030405");
    assert_eq!(updated["name"], "Papeterie Dupont");

    let response = delete(
        build_test_app(pool.clone()),
        &format!("/api/suppliers/{}", supplier["id"]),
    )
    .await;
    assert_eq!(body_json(response).await["message"], "Fournisseur supprimé");
    assert!(list(&pool, "/api/suppliers").await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn clients_patch_keeps_unsent_fields(pool: PgPool) {
    let client = create(
        &pool,
        "/api/clients",
        json!({ "name": "Fleuriste", "email": "fleurs@exemple.fr", "address": "3 rue des Lilas" }),
    )
    .await;

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/clients/{}", client["id"]),
        json!({ "name": "Fleuriste Rose" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Fleuriste Rose");
    assert_eq!(updated["email"], "fleurs@exemple.fr");
    assert_eq!(updated["address"], "3 rue des Lilas");

    let response = patch_json(build_test_app(pool.clone()), "/api/clients/9999", json!({ "name": "Personne" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Client introuvable");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn lists_are_newest_first(pool: PgPool) {
    create(&pool, "/api/clients", json!({ "name": "Ancien" })).await;
    create(&pool, "/api/clients", json!({ "name": "Récent" })).await;
    let clients = list(&pool, "/api/clients").await;
    assert_eq!(clients[0]["name"], "Récent");
    assert_eq!(clients[1]["name"], "Ancien");

    let older = create(&pool, "/api/projects", json!({ "name": "Premier" })).await;
    create(&pool, "/api/projects", json!({ "name": "Second" })).await;
    let projects = list(&pool, "/api/projects").await;
    assert_eq!(projects[0]["name"], "Second");
    assert_eq!(projects[1]["name"], "Premier");

    create(&pool, "/api/tasks", json!({ "title": "Avant", "projectId": older["id"] })).await;
    create(&pool, "/api/tasks", json!({ "title": "Après", "projectId": older["id"] })).await;
    let tasks = list(&pool, "/api/tasks").await;
    assert_eq!(tasks[0]["title"], "Après");

    create(&pool, "/api/suppliers", json!({ "name": "Vieux" })).await;
    create(&pool, "/api/suppliers", json!({ "name": "Neuf" })).await;
    assert_eq!(list(&pool, "/api/suppliers").await[0]["name"], "Neuf");
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn stats_count_active_projects_open_tasks_and_all_clients(pool: PgPool) {
    create(&pool, "/api/clients", json!({ "name": "A" })).await;
    create(&pool, "/api/clients", json!({ "name": "B" })).await;
    let active = create(&pool, "/api/projects", json!({ "name": "Actif" })).await;
    create(&pool, "/api/projects", json!({ "name": "Pause", "status": "En attente" })).await;
    create(&pool, "/api/projects", json!({ "name": "Fini", "status": "Terminé" })).await;

    create(&pool, "/api/tasks", json!({ "title": "1", "projectId": active["id"] })).await;
    let done = create(&pool, "/api/tasks", json!({ "title": "2", "projectId": active["id"] })).await;
    patch_json(
        build_test_app(pool.clone()),
        &format!("/api/tasks/{}", done["id"]),
        json!({ "completed": true }),
    )
    .await;

    let stats = body_json(get(build_test_app(pool.clone()), "/api/stats").await).await;
    assert_eq!(stats, json!({ "projectsCount": 1, "clientsCount": 2, "tasksCount": 1 }));
}

// ---------------------------------------------------------------------------
// Users and settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn current_user_defaults_to_the_admin(pool: PgPool) {
    let user = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    assert_eq!(user["email"], "admin@gestionpro.fr");
    assert_eq!(user["role"], "admin");
    assert!(user.get("password").is_none());

    // A second call reuses the same account
    let again = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    assert_eq!(again["id"], user["id"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn projects_default_to_the_admin_owner(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Sans owner", "userId": 777 })).await;
    let user = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    assert_eq!(project["userId"], user["id"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn login_issues_a_token_for_the_current_user(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/auth/login",
        json!({ "email": "admin@gestionpro.fr", "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/auth/login",
        json!({ "email": "admin@gestionpro.fr", "password": "password123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth = body_json(response).await;
    let token = auth["token"].as_str().unwrap();

    let request = Request::builder()
        .uri("/api/user/current")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = build_test_app(pool.clone()).oneshot(request).await.unwrap();
    let current = body_json(response).await;
    assert_eq!(current["id"], auth["user"]["id"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn password_change_requires_the_current_password(pool: PgPool) {
    let user = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    let uri = format!("/api/user/{}/password", user["id"]);

    let response = patch_json(
        build_test_app(pool.clone()),
        &uri,
        json!({
            "currentPassword": "pas-le-bon",
            "newPassword": "nouveau123",
            "confirmPassword": "nouveau123"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Mot de passe actuel incorrect");

    let response = patch_json(
        build_test_app(pool.clone()),
        &uri,
        json!({
            "currentPassword": "password123",
            "newPassword": "nouveau123",
            "confirmPassword": "nouveau123"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/auth/login",
        json!({ "email": "admin@gestionpro.fr", "password": "nouveau123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn settings_groups_save_independently(pool: PgPool) {
    let user = body_json(get(build_test_app(pool.clone()), "/api/user/current").await).await;
    let base = format!("/api/user/{}", user["id"]);

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("{}/appearance", base),
        json!({ "theme": "Sombre", "primaryColor": "green" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("{}/notifications", base),
        json!({ "taskNotifications": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let settings = body_json(get(build_test_app(pool.clone()), &format!("{}/settings", base)).await).await;
    assert_eq!(settings["appearance"]["theme"], "Sombre");
    assert_eq!(settings["appearance"]["primaryColor"], "green");
    assert_eq!(settings["appearance"]["palette"]["dark"], true);
    assert_eq!(settings["notifications"]["taskNotifications"], false);
    assert_eq!(settings["notifications"]["emailNotifications"], true);
    assert_eq!(settings["general"]["language"], "Français");
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn calendar_places_tasks_and_deadlines_on_their_day(pool: PgPool) {
    let project = create(
        &pool,
        "/api/projects",
        json!({ "name": "Salon", "deadline": "2025-03-20" }),
    )
    .await;
    create(
        &pool,
        "/api/tasks",
        json!({ "title": "Stand", "projectId": project["id"], "dueDate": "2025-03-14T09:00:00Z" }),
    )
    .await;

    let response = get(build_test_app(pool.clone()), "/api/calendar?year=2025&month=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;

    let days = view["days"].as_array().unwrap();
    assert_eq!(days.len(), 42);
    // March 2025 starts on a Saturday
    assert_eq!(days[0]["date"], "2025-02-23");
    assert_eq!(view["outlook"]["connected"], false);

    let day = |date: &str| days.iter().find(|d| d["date"] == date).unwrap().clone();
    assert_eq!(day("2025-03-14")["tasks"][0]["title"], "Stand");
    assert_eq!(day("2025-03-20")["projects"][0]["name"], "Salon");
    assert!(day("2025-03-15")["tasks"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn calendar_queries_stay_inside_the_requested_range(pool: PgPool) {
    let project = create(&pool, "/api/projects", json!({ "name": "Foire", "deadline": "2025-03-05" })).await;
    create(&pool, "/api/projects", json!({ "name": "Hors mois", "deadline": "2025-06-10" })).await;
    for (title, due) in [("Dedans", "2025-03-05T10:00:00Z"), ("Dehors", "2025-06-10T10:00:00Z")] {
        create(
            &pool,
            "/api/tasks",
            json!({ "title": title, "projectId": project["id"], "dueDate": due }),
        )
        .await;
    }

    // The March 2025 grid runs from 23 February to 5 April
    let from = Utc.with_ymd_and_hms(2025, 2, 23, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2025, 4, 6, 0, 0, 0).unwrap();

    let tasks = TaskRepo::list_due_between(&pool, from, to).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Dedans");

    let projects = ProjectRepo::list_deadline_between(&pool, from, to).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Foire");

    let view = body_json(get(build_test_app(pool.clone()), "/api/calendar?year=2025&month=3").await).await;
    let placed: usize = view["days"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["tasks"].as_array().unwrap().len())
        .sum();
    assert_eq!(placed, 1);
}
