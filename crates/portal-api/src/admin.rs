//! Admin dashboard operations
//!
//! Protected endpoints; the server enforces the admin role and answers
//! 403 for regular accounts, which surfaces as `RequestFailed`.

use portal_client::{ApiClient, Result};

use crate::types::{AdminUserRow, SignupPoint};

/// All registered users, for the admin user table.
pub async fn list_users(client: &ApiClient) -> Result<Vec<AdminUserRow>> {
    client.get("/admin/users").await
}

/// Daily signup counts over the last `days` days.
pub async fn signup_stats(client: &ApiClient, days: u32) -> Result<Vec<SignupPoint>> {
    client
        .get(&format!("/admin/stats/signups?days={days}"))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_client::ClientConfig;

    #[tokio::test]
    async fn list_users_decodes_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/users")
            .with_status(200)
            .with_body(
                r#"[
                    {"id":"1","email":"ada@example.com","username":"ada","emailVerified":true,"role":"admin","createdAt":"2026-01-04T09:00:00Z"},
                    {"id":"2","email":"bob@example.com","username":"bob","emailVerified":false,"createdAt":"2026-02-11T12:30:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(ClientConfig::new(server.url())).unwrap();
        let users = list_users(&client).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "ada");
        assert_eq!(users[1].role, None);
    }

    #[tokio::test]
    async fn signup_stats_passes_days_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/stats/signups?days=7")
            .with_status(200)
            .with_body(r#"[{"date":"2026-08-01","count":3}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::new(ClientConfig::new(server.url())).unwrap();
        let points = signup_stats(&client, 7).await.unwrap();

        assert_eq!(points[0].count, 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_for_non_admins() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/users")
            .with_status(403)
            .with_body(r#"{"detail":"Admin role required"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(ClientConfig::new(server.url())).unwrap();
        let err = list_users(&client).await.unwrap_err();

        match err {
            portal_client::Error::RequestFailed { status, message, .. } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Admin role required");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }
}
