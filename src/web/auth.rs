use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::web::{
    AppState,
    error::{ApiError, internal},
    models::Papel,
};

pub const TOKEN_TTL_DAYS: i64 = 7;
pub const BCRYPT_COST: u32 = 10;

/// Identical for wrong password and unknown/inactive account.
pub const CREDENCIAIS_INVALIDAS: &str = "Credenciais inválidas";

/// Company label shown for administrators, who belong to no tenant.
const ORGANIZACAO: &str = "CISMEPAR";

/// Claims embedded in the signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub tipo: Papel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa: Option<Uuid>,
    pub exp: i64,
}

/// Authenticated caller, derived from a verified token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub tipo: Papel,
    pub empresa: Option<Uuid>,
}

impl AuthUser {
    pub fn das_claims(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            tipo: claims.tipo,
            empresa: claims.empresa,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.tipo == Papel::Admin
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_do_header(parts.headers.get(header::AUTHORIZATION))
            .ok_or_else(|| ApiError::unauthenticated("Não autenticado"))?;
        let claims = decodificar_token(&state.config().jwt_secret, token)?;
        Ok(AuthUser::das_claims(claims))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_do_header(valor: Option<&header::HeaderValue>) -> Option<&str> {
    valor?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn emitir_token(
    secret: &str,
    usuario_id: Uuid,
    tipo: Papel,
    empresa: Option<Uuid>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: usuario_id,
        tipo,
        empresa,
        exp: (Utc::now() + ChronoDuration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry; any failure is an `Unauthenticated`.
pub fn decodificar_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|dados| dados.claims)
    .map_err(|_| ApiError::unauthenticated("Token inválido"))
}

pub fn hash_password(senha: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(senha, BCRYPT_COST)
}

pub fn verify_password(senha: &str, senha_hash: &str) -> bool {
    bcrypt::verify(senha, senha_hash).unwrap_or(false)
}

/// Admin-only operations answer 403 for everyone else.
pub fn require_admin(usuario: &AuthUser) -> Result<(), ApiError> {
    if usuario.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Acesso negado"))
    }
}

/// Tenant ownership: administrators see everything; company users only
/// their own company's records.
pub fn verificar_propriedade(
    tipo: Papel,
    empresa_do_usuario: Option<Uuid>,
    empresa_do_registro: Uuid,
) -> Result<(), ApiError> {
    if tipo == Papel::Admin || empresa_do_usuario == Some(empresa_do_registro) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Sem permissão"))
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: UsuarioLogado,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioLogado {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub tipo: Papel,
    pub empresa: String,
    pub empresa_id: Option<Uuid>,
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    id: Uuid,
    email: String,
    senha_hash: String,
    nome: String,
    papel: String,
    empresa_id: Option<Uuid>,
    empresa_nome: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let senha = body.senha.as_deref().unwrap_or_default();
    if email.is_empty() || senha.is_empty() {
        return Err(ApiError::validation("Email e senha obrigatórios"));
    }

    let conta = buscar_conta_ativa(state.pool_ref(), &email.to_lowercase())
        .await
        .map_err(internal("Erro no servidor"))?
        .ok_or_else(|| ApiError::unauthenticated(CREDENCIAIS_INVALIDAS))?;

    if !verify_password(senha, &conta.senha_hash) {
        return Err(ApiError::unauthenticated(CREDENCIAIS_INVALIDAS));
    }

    let tipo = Papel::parse(&conta.papel).ok_or_else(|| {
        error!(usuario = %conta.id, papel = %conta.papel, "papel desconhecido no banco");
        ApiError::Internal("Erro no servidor".to_string())
    })?;

    let token = emitir_token(&state.config().jwt_secret, conta.id, tipo, conta.empresa_id)
        .map_err(internal("Erro no servidor"))?;

    Ok(Json(LoginResponse {
        token,
        usuario: UsuarioLogado {
            id: conta.id,
            email: conta.email,
            nome: conta.nome,
            tipo,
            empresa: conta
                .empresa_nome
                .unwrap_or_else(|| ORGANIZACAO.to_string()),
            empresa_id: conta.empresa_id,
        },
    }))
}

async fn buscar_conta_ativa(pool: &PgPool, email: &str) -> sqlx::Result<Option<LoginRow>> {
    sqlx::query_as::<_, LoginRow>(
        "SELECT u.id, u.email, u.senha_hash, u.nome, u.papel, u.empresa_id, e.nome AS empresa_nome
         FROM usuarios u
         LEFT JOIN empresas e ON e.id = u.empresa_id
         WHERE u.email = $1 AND u.status = 'ativo'",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_roundtrip_preserva_as_claims() {
        let id = Uuid::new_v4();
        let empresa = Uuid::new_v4();
        let token = emitir_token(SECRET, id, Papel::Empresa, Some(empresa)).unwrap();

        let claims = decodificar_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.tipo, Papel::Empresa);
        assert_eq!(claims.empresa, Some(empresa));
    }

    #[test]
    fn token_de_admin_sem_empresa() {
        let token = emitir_token(SECRET, Uuid::new_v4(), Papel::Admin, None).unwrap();
        let claims = decodificar_token(SECRET, &token).unwrap();
        assert_eq!(claims.tipo, Papel::Admin);
        assert_eq!(claims.empresa, None);
    }

    #[test]
    fn token_com_chave_errada_e_rejeitado() {
        let token = emitir_token(SECRET, Uuid::new_v4(), Papel::Admin, None).unwrap();
        assert!(decodificar_token("outra-chave", &token).is_err());
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            tipo: Papel::Admin,
            empresa: None,
            exp: (Utc::now() - ChronoDuration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(decodificar_token(SECRET, &token).is_err());
    }

    #[test]
    fn bearer_do_header_extrai_o_token() {
        let valor = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(bearer_do_header(Some(&valor)), Some("abc.def.ghi"));

        let sem_prefixo = HeaderValue::from_static("abc.def.ghi");
        assert_eq!(bearer_do_header(Some(&sem_prefixo)), None);
        assert_eq!(bearer_do_header(None), None);

        let vazio = HeaderValue::from_static("Bearer ");
        assert_eq!(bearer_do_header(Some(&vazio)), None);
    }

    #[test]
    fn senha_hash_e_verificacao() {
        let hash = hash_password("123").unwrap();
        assert!(verify_password("123", &hash));
        assert!(!verify_password("1234", &hash));
        assert!(!verify_password("123", "hash-invalido"));
    }

    #[test]
    fn propriedade_por_papel_e_empresa() {
        let dona = Uuid::new_v4();
        let outra = Uuid::new_v4();
        assert!(verificar_propriedade(Papel::Admin, None, dona).is_ok());
        assert!(verificar_propriedade(Papel::Empresa, Some(dona), dona).is_ok());
        assert!(verificar_propriedade(Papel::Empresa, Some(outra), dona).is_err());
        assert!(verificar_propriedade(Papel::Empresa, None, dona).is_err());
    }
}
