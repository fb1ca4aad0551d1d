use axum::body::to_bytes;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::dashboards::d100_pharmacy_overview::get_aggregator;
use crate::shared::format::format_number;
use crate::shared::time_range::BusinessTimezone;

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль:
/// - Время (в часовом поясе аптеки)
/// - Длительность (ms)
/// - Размер ответа (форматированный)
/// - Статус код
/// - Метод и путь
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    let tz = get_aggregator()
        .map(|a| a.timezone())
        .unwrap_or_default();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(_) => {
            println!(
                "{}",
                log_line(tz, start.elapsed().as_millis(), None, parts.status, method.as_str(), uri.path())
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    println!(
        "{}",
        log_line(
            tz,
            start.elapsed().as_millis(),
            Some(bytes.len()),
            parts.status,
            method.as_str(),
            uri.path()
        )
    );

    Response::from_parts(parts, Body::from(bytes))
}

fn log_line(
    tz: BusinessTimezone,
    duration_ms: u128,
    size: Option<usize>,
    status: StatusCode,
    method: &str,
    path: &str,
) -> String {
    let timestamp = tz.localize(&Utc::now());
    // голубой для 2xx, коричневый для остальных
    let color_code = if status.is_success() && size.is_some() {
        "36"
    } else {
        "33"
    };
    let size = size.map(format_number).unwrap_or_else(|| "error".to_string());

    format!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        timestamp.format("%H:%M:%S"),
        duration_ms,
        size,
        status.as_u16(),
        method,
        path
    )
}
