use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::web::error::ErroBody;

/// Fixed-window request counter per client address. Coarse by design: the
/// goal is a denial-of-service brake on the public deployment, not fair
/// scheduling.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    message: &'static str,
    hits: Mutex<HashMap<IpAddr, Window>>,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            max,
            window,
            message,
            hits: Mutex::new(HashMap::new()),
        })
    }

    pub fn allow(&self, ip: IpAddr) -> bool {
        self.allow_at(ip, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        let janela = hits.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(janela.started) >= self.window {
            janela.started = now;
            janela.count = 0;
        }
        janela.count += 1;
        janela.count <= self.max
    }
}

/// Middleware applying a limiter to the wrapped routes. Requests without a
/// resolvable peer address pass through.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    if let Some(ip) = ip {
        if !limiter.allow(ip) {
            warn!(%ip, "requisição bloqueada pelo limite de taxa");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErroBody {
                    erro: limiter.message.to_string(),
                }),
            )
                .into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip() -> IpAddr {
        "10.0.0.1".parse().unwrap()
    }

    #[test]
    fn permite_ate_o_limite_da_janela() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60), "bloqueado");
        let agora = Instant::now();

        assert!(limiter.allow_at(ip(), agora));
        assert!(limiter.allow_at(ip(), agora));
        assert!(limiter.allow_at(ip(), agora));
        assert!(!limiter.allow_at(ip(), agora));
    }

    #[test]
    fn janela_expirada_zera_o_contador() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), "bloqueado");
        let inicio = Instant::now();

        assert!(limiter.allow_at(ip(), inicio));
        assert!(!limiter.allow_at(ip(), inicio + Duration::from_secs(30)));
        assert!(limiter.allow_at(ip(), inicio + Duration::from_secs(61)));
    }

    #[test]
    fn contadores_sao_por_endereco() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), "bloqueado");
        let agora = Instant::now();
        let outro: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.allow_at(ip(), agora));
        assert!(!limiter.allow_at(ip(), agora));
        assert!(limiter.allow_at(outro, agora));
    }
}
