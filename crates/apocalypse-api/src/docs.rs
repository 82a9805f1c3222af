use axum::response::Html;

const REDOC_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Survivors API</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>body { margin: 0; padding: 0; }</style>
  </head>
  <body>
    <redoc spec-url="/swagger.yaml"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc/bundles/redoc.standalone.js"></script>
  </body>
</html>
"#;

/// GET /docs — ReDoc viewer over the served OpenAPI description.
pub async fn redoc() -> Html<&'static str> {
    Html(REDOC_PAGE)
}
