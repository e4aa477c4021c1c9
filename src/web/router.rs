use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::info;

use crate::web::{
    AppState, admin, auth, categorias, empresas, exames,
    rate_limit::{self, RateLimiter},
    seed, templates,
};

const JANELA_DE_LIMITE: Duration = Duration::from_secs(15 * 60);
const LIMITE_GERAL: u32 = 100;
const LIMITE_LOGIN: u32 = 5;

pub fn build_router(state: AppState) -> Router {
    let throttle = state.config().rate_limit_enabled();

    let mut rota_login = Router::new().route("/api/auth/login", post(auth::login));
    if throttle {
        let limite_login = RateLimiter::new(
            LIMITE_LOGIN,
            JANELA_DE_LIMITE,
            "Muitas tentativas de login. Tente novamente em 15 minutos.",
        );
        rota_login = rota_login.layer(middleware::from_fn_with_state(
            limite_login,
            rate_limit::enforce,
        ));
    }

    let mut api = Router::new()
        .route("/api/empresas", get(empresas::listar))
        .route(
            "/api/categorias",
            get(categorias::listar).post(categorias::criar),
        )
        .route("/api/categorias/:id", delete(categorias::remover))
        .route(
            "/api/exames",
            get(exames::listar)
                .post(exames::criar)
                .layer(DefaultBodyLimit::max(
                    exames::MAX_UPLOAD_INDIVIDUAL + 2 * 1024 * 1024,
                )),
        )
        .route(
            "/api/exames/massivo",
            post(exames::criar_massivo).layer(DefaultBodyLimit::max(
                exames::MAX_ARQUIVOS_MASSIVO * exames::MAX_UPLOAD_MASSIVO + 16 * 1024 * 1024,
            )),
        )
        .route(
            "/api/exames/:id",
            axum::routing::put(exames::atualizar).delete(exames::excluir),
        )
        .route(
            "/api/exames/:id/arquivo/:arquivo_id",
            get(exames::baixar_arquivo),
        )
        .route("/api/admin/criar-usuario", post(admin::criar_usuario))
        .route("/api/admin/criar-empresa", post(admin::criar_empresa))
        .route("/api/admin/usuarios", get(admin::listar_usuarios))
        .route("/api/admin/trocar-senha", post(admin::trocar_senha))
        .route("/api/admin/usuarios/:id", delete(admin::desativar_usuario))
        .route("/api/seed", post(seed::executar))
        .merge(rota_login);

    if throttle {
        let limite_geral = RateLimiter::new(
            LIMITE_GERAL,
            JANELA_DE_LIMITE,
            "Muitas requisições. Tente novamente em 15 minutos.",
        );
        api = api.layer(middleware::from_fn_with_state(
            limite_geral,
            rate_limit::enforce,
        ));
        info!("limite de taxa ativado (produção)");
    } else {
        info!("limite de taxa desativado (desenvolvimento)");
    }

    Router::new()
        .route("/", get(templates::index))
        .route("/healthz", get(healthz))
        .merge(api)
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
