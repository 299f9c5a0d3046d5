pub mod sequence;

pub async fn health_check() -> &'static str {
    "ok"
}
