// Cache-miss path of the data views: one synchronous refresh, then Unavailable.

#[cfg(test)]
mod test {

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::cache::resource::Resource;
    use crate::credentials::store::Credentials;
    use crate::error::ProxyError;
    use crate::proxy::service::ProxyService;
    use crate::tests::common::test_upstream_config;

    #[tokio::test]
    async fn miss_triggers_exactly_one_refresh_before_unavailable() {
        let server = MockServer::start_async().await;
        let flights = server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(500);
            })
            .await;
        let updates = server
            .mock_async(|when, then| {
                when.method(GET).path("/updates");
                then.status(500);
            })
            .await;

        let service = ProxyService::new(
            test_upstream_config(&server.base_url()),
            Credentials::new("idABC", "keyXYZ"),
        )
        .unwrap();

        let err = service.read(Resource::Primary).await.unwrap_err();
        assert!(matches!(err, ProxyError::Unavailable(Resource::Primary)));
        flights.assert_hits_async(1).await;
        updates.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn no_credentials_read_is_unavailable_without_upstream_calls() {
        let server = MockServer::start_async().await;
        let flights = server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).json_body(json!({"flights": [1]}));
            })
            .await;

        let service =
            ProxyService::new(test_upstream_config(&server.base_url()), Credentials::default())
                .unwrap();

        let err = service.read(Resource::Primary).await.unwrap_err();
        assert!(matches!(err, ProxyError::Unavailable(Resource::Primary)));
        flights.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn fallback_refresh_fills_both_and_later_reads_hit_cache() {
        let server = MockServer::start_async().await;
        let flights = server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).json_body(json!({"flights": [1]}));
            })
            .await;
        let updates = server
            .mock_async(|when, then| {
                when.method(GET).path("/updates");
                then.status(200).json_body(json!({"updates": [7]}));
            })
            .await;

        let service = ProxyService::new(
            test_upstream_config(&server.base_url()),
            Credentials::new("idABC", "keyXYZ"),
        )
        .unwrap();

        let primary = service.read(Resource::Primary).await.unwrap();
        assert_eq!(*primary, json!({"flights": [1]}));

        let secondary = service.read(Resource::Secondary).await.unwrap();
        assert_eq!(*secondary, json!({"updates": [7]}));
        service.read(Resource::Primary).await.unwrap();

        flights.assert_hits_async(1).await;
        updates.assert_hits_async(1).await;

        let status = service.status().await;
        assert!(status.credentials_configured);
        assert!(status.primary_cached && status.secondary_cached);
        assert!(status.last_refreshed_at.is_some());
    }

    #[tokio::test]
    async fn malformed_upstream_json_is_served_as_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).body("{truncated");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/updates");
                then.status(500);
            })
            .await;

        let service = ProxyService::new(
            test_upstream_config(&server.base_url()),
            Credentials::new("idABC", "keyXYZ"),
        )
        .unwrap();

        let doc = service.read(Resource::Primary).await.unwrap();
        assert!(doc.is_null());
    }

    #[tokio::test]
    async fn malformed_200_replaces_good_document_with_present_null() {
        let server = MockServer::start_async().await;
        let flights_ok = server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).json_body(json!({"flights": [1]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/updates");
                then.status(200).json_body(json!({"updates": []}));
            })
            .await;

        let service = ProxyService::new(
            test_upstream_config(&server.base_url()),
            Credentials::new("idABC", "keyXYZ"),
        )
        .unwrap();
        assert_eq!(*service.read(Resource::Primary).await.unwrap(), json!({"flights": [1]}));

        flights_ok.delete_async().await;
        let flights_bad = server
            .mock_async(|when, then| {
                when.method(GET).path("/flights");
                then.status(200).body("<html>gateway page</html>");
            })
            .await;
        let outcome = service.refresh_cycle().run().await;
        assert!(outcome.primary_updated);

        // null is a present document: served as-is, no fallback refresh
        let doc = service.read(Resource::Primary).await.unwrap();
        assert!(doc.is_null());
        flights_bad.assert_hits_async(1).await;
    }
}
