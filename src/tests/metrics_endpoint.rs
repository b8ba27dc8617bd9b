#[cfg(test)]
mod test {

    use http::StatusCode;
    use httpmock::MockServer;

    use crate::credentials::store::Credentials;
    use crate::tests::common::{build_reqwest_client, spawn_proxy, test_upstream_config};

    #[tokio::test]
    async fn metrics_are_exposed_in_prometheus_format() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let (handle, addr, _) =
            spawn_proxy(test_upstream_config(&server.base_url()), Credentials::default()).await?;

        let res = build_reqwest_client()
            .get(format!("http://{}/metrics", addr))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let text = res.text().await?;
        assert!(text.contains("flightopsproxy_up"));
        assert!(text.contains("flightopsproxy_cache_last_refresh_timestamp_seconds"));

        handle.abort();
        Ok(())
    }
}
