mod common;

use common::FakeServer;
use copicom_backend::api::{ApiClient, ApiError};
use serde_json::json;

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(reqwest::Client::new(), base_url).expect("valid base url")
}

#[tokio::test]
async fn fetches_raw_server_records() {
    let server = FakeServer::with_notifications(json!([
        { "_id": "a1", "titulo": "Corte de agua", "fecha": "2024-05-01T10:00:00Z", "tipo": "Alerta" },
        { "_id": 7, "tipo": "encuesta", "encuestaId": "42" }
    ]));
    let api = client(&server.clone().spawn().await);

    let list = api.fetch_notifications().await.expect("fetch");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id_text().as_deref(), Some("a1"));
    assert_eq!(list[0].titulo.as_deref(), Some("Corte de agua"));
    assert_eq!(list[1].id_text().as_deref(), Some("7"));
    assert_eq!(list[1].encuesta_id.as_deref(), Some("42"));
    assert_eq!(server.calls(), vec!["GET /notificaciones"]);
}

#[tokio::test]
async fn numeric_link_ids_do_not_spoil_the_list() {
    let server = FakeServer::with_notifications(json!([
        { "_id": "n1", "tipo": "noticia", "noticiaId": 5, "fecha": "2024-05-01T10:00:00Z" },
        { "_id": 8, "tipo": "encuesta", "encuestaId": 42, "linkId": 43 }
    ]));
    let api = client(&server.spawn().await);

    let list = api.fetch_notifications().await.expect("fetch");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].noticia_id.as_deref(), Some("5"));
    assert_eq!(list[1].encuesta_id.as_deref(), Some("42"));
    assert_eq!(list[1].link_id.as_deref(), Some("43"));
}

#[tokio::test]
async fn error_status_is_an_error() {
    let server = FakeServer {
        fail_list: true,
        ..FakeServer::default()
    };
    let api = client(&server.spawn().await);

    match api.fetch_notifications().await {
        Err(ApiError::Status { status, .. }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    // bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = client(&format!("http://{addr}/api"));
    assert!(matches!(api.fetch_notifications().await, Err(ApiError::Request(_))));
}

#[tokio::test]
async fn write_endpoints_hit_the_expected_paths() {
    let server = FakeServer::default();
    let api = client(&server.clone().spawn().await);

    api.mark_read("n-1").await.expect("mark read");
    api.delete("n-2").await.expect("delete");
    api.register_push_token("ExponentPushToken[abc]").await.expect("register");

    assert_eq!(
        server.calls(),
        vec![
            "PATCH /notificaciones/n-1/leida",
            "DELETE /notificaciones/n-2",
            "POST /tokens/register ExponentPushToken[abc]",
        ]
    );
}
