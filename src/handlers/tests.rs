//! Tests for the stock routes.

#[cfg(test)]
mod handler_tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::handlers::{self, ServeDir};
    use crate::parser::{parse_request, HeaderName, Headers, HttpRequest, Method};
    use crate::server::{HttpResponse, Resolution, Router, StatusCode};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    /// A fresh, empty directory under the system temp dir.
    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rawhttp-test-{pid}-{n}",
            pid = std::process::id(),
            n = NEXT_DIR.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn dispatch(router: &Router, raw: &[u8]) -> HttpResponse {
        let request = parse_request(raw).unwrap();
        match router.resolve(request.path(), request.method) {
            Resolution::Found(route) => (route.handler)(request).await.unwrap(),
            Resolution::MethodNotAllowed(_) => panic!("method not allowed"),
            Resolution::NotFound => panic!("not found"),
        }
    }

    #[tokio::test]
    async fn test_root() {
        let router = handlers::routes(ServeDir::default()).unwrap();
        let response = dispatch(&router, b"GET / HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::Ok);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_echo() {
        let router = handlers::routes(ServeDir::default()).unwrap();
        let response = dispatch(&router, b"GET /echo/abc HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.headers.get(HeaderName::ContentType), Some("text/plain"));
        assert_eq!(response.headers.get(HeaderName::ContentLength), Some("3"));
        assert_eq!(response.body, b"abc");
    }

    #[tokio::test]
    async fn test_user_agent() {
        let router = handlers::routes(ServeDir::default()).unwrap();
        let response = dispatch(&router, b"GET /user-agent HTTP/1.1\r\nUser-Agent: foobar/1.2.3\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body, b"foobar/1.2.3");

        let response = dispatch(&router, b"GET /user-agent HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::NotFound);
    }

    #[tokio::test]
    async fn test_stock_routes_and_compression() {
        let router = handlers::routes(ServeDir::default()).unwrap();
        let routes: Vec<(String, Vec<Method>)> = router
            .routes()
            .map(|(pattern, methods)| (pattern.to_string(), methods))
            .collect();
        assert_eq!(routes.len(), 4);
        assert!(routes.contains(&("/files/".to_string(), vec![Method::GET, Method::POST])));

        let Resolution::Found(echo) = router.resolve("/echo/x", Method::GET) else {
            panic!("echo route missing");
        };
        assert!(echo.compress);
        let Resolution::Found(files) = router.resolve("/files/x", Method::GET) else {
            panic!("files route missing");
        };
        assert!(!files.compress);
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = scratch_dir();
        std::fs::write(dir.join("foo"), [0x00, 0xff, b'h', b'i']).unwrap();
        let router = handlers::routes(ServeDir::new(&dir, 1024)).unwrap();

        let response = dispatch(&router, b"GET /files/foo HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.headers.get(HeaderName::ContentType), Some("application/octet-stream"));
        assert_eq!(response.headers.get(HeaderName::ContentLength), Some("4"));
        assert_eq!(response.body, vec![0x00, 0xff, b'h', b'i']);

        let response = dispatch(&router, b"GET /files/missing HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::NotFound);

        let response = dispatch(&router, b"GET /files/../etc/passwd HTTP/1.1\r\n\r\n").await;
        assert_eq!(response.status, StatusCode::NotFound);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_file() {
        let dir = scratch_dir();
        let router = handlers::routes(ServeDir::new(&dir, 1024)).unwrap();

        let raw = b"POST /files/new HTTP/1.1\r\nContent-Length: 5\r\nContent-Type: application/octet-stream\r\n\r\nhello-trailing";
        let response = dispatch(&router, raw).await;
        assert_eq!(response.status, StatusCode::Created);
        assert_eq!(std::fs::read(dir.join("new")).unwrap(), b"hello");

        // Never overwritten
        let raw = b"POST /files/new HTTP/1.1\r\nContent-Length: 3\r\n\r\nbye";
        let response = dispatch(&router, raw).await;
        assert_eq!(response.status, StatusCode::Forbidden);
        assert_eq!(std::fs::read(dir.join("new")).unwrap(), b"hello");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_file_rejections() {
        let dir = scratch_dir();
        let router = handlers::routes(ServeDir::new(&dir, 4)).unwrap();

        let response = dispatch(&router, b"POST /files/a HTTP/1.1\r\n\r\nabc").await;
        assert_eq!(response.status, StatusCode::LengthRequired);

        let response = dispatch(&router, b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcde").await;
        assert_eq!(response.status, StatusCode::ContentTooLarge);

        let response = dispatch(&router, b"POST /files/a HTTP/1.1\r\nContent-Length: 4\r\n\r\nab").await;
        assert_eq!(response.status, StatusCode::BadRequest);

        let response = dispatch(&router, b"POST /files/../a HTTP/1.1\r\nContent-Length: 2\r\n\r\nab").await;
        assert_eq!(response.status, StatusCode::Forbidden);

        assert!(!dir.join("a").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_file_from_built_request() {
        let dir = scratch_dir();
        let serve_dir = ServeDir::new(&dir, 16);

        let mut headers = Headers::default();
        headers.set(HeaderName::ContentLength, "4");
        let request = HttpRequest::with_body(Method::POST, "/files/built", headers, b"data".to_vec());
        assert_eq!(request.content_length(), Some(4));

        let response = serve_dir.write_file(request).await.unwrap();
        assert_eq!(response.status, StatusCode::Created);
        assert_eq!(std::fs::read(dir.join("built")).unwrap(), b"data");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_serve_dir_defaults() {
        let serve_dir = ServeDir::default();
        assert_eq!(serve_dir.max_file_size, 1_000_000);
        assert_eq!(
            serve_dir.directory,
            PathBuf::from("/tmp/data/codecrafters.io/http-server-tester/")
        );
    }

    #[test]
    fn test_serve_dir_from_json() {
        let serve_dir: ServeDir = serde_json::from_str(r#"{"directory": "/srv/files"}"#).unwrap();
        assert_eq!(serve_dir.directory, PathBuf::from("/srv/files"));
        assert_eq!(serve_dir.max_file_size, 1_000_000);
    }
}
