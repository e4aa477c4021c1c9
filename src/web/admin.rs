use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::web::{
    AppState,
    auth::{self, AuthUser, require_admin},
    error::{ApiError, internal, violacao_de_unicidade},
    models::{MensagemDto, Papel, RefDto, Status, UsuarioRow},
};

const SENHA_MINIMA: usize = 3;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriarUsuarioRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nome: Option<String>,
    pub tipo: Option<String>,
    pub empresa_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct UsuarioCriadoDto {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub tipo: Papel,
}

#[derive(Serialize)]
pub struct CriarUsuarioResponse {
    pub mensagem: String,
    pub usuario: UsuarioCriadoDto,
}

pub async fn criar_usuario(
    State(state): State<AppState>,
    usuario: AuthUser,
    Json(body): Json<CriarUsuarioRequest>,
) -> Result<(StatusCode, Json<CriarUsuarioResponse>), ApiError> {
    require_admin(&usuario)?;

    let email = body.email.as_deref().map(str::trim).unwrap_or_default();
    let senha = body.senha.as_deref().unwrap_or_default();
    let nome = body.nome.as_deref().map(str::trim).unwrap_or_default();
    let tipo = body.tipo.as_deref().unwrap_or_default();

    if email.is_empty() || senha.is_empty() || nome.is_empty() || tipo.is_empty() {
        return Err(ApiError::validation("Campos obrigatórios faltando"));
    }
    let tipo = Papel::parse(tipo).ok_or_else(|| ApiError::validation("Tipo de usuário inválido"))?;
    if senha.chars().count() < SENHA_MINIMA {
        return Err(ApiError::validation(
            "Senha deve ter no mínimo 3 caracteres",
        ));
    }

    let senha_hash = auth::hash_password(senha).map_err(internal("Erro ao criar usuário"))?;
    let email = email.to_lowercase();
    let empresa_id = match tipo {
        Papel::Empresa => body.empresa_id,
        Papel::Admin => None,
    };

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO usuarios (id, email, senha_hash, nome, papel, empresa_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(&email)
    .bind(&senha_hash)
    .bind(nome)
    .bind(tipo.as_str())
    .bind(empresa_id)
    .execute(state.pool_ref())
    .await
    .map_err(|err| {
        if violacao_de_unicidade(&err) {
            ApiError::conflict("Email já cadastrado")
        } else {
            internal("Erro ao criar usuário")(err)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CriarUsuarioResponse {
            mensagem: "Usuário criado".to_string(),
            usuario: UsuarioCriadoDto {
                id,
                email,
                nome: nome.to_string(),
                tipo,
            },
        }),
    ))
}

#[derive(Deserialize)]
pub struct CriarEmpresaRequest {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
}

#[derive(Serialize)]
pub struct CriarEmpresaResponse {
    pub mensagem: String,
    pub empresa: RefDto,
}

pub async fn criar_empresa(
    State(state): State<AppState>,
    usuario: AuthUser,
    Json(body): Json<CriarEmpresaRequest>,
) -> Result<(StatusCode, Json<CriarEmpresaResponse>), ApiError> {
    require_admin(&usuario)?;

    let nome = body.nome.as_deref().map(str::trim).unwrap_or_default();
    if nome.is_empty() {
        return Err(ApiError::validation("Nome é obrigatório"));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO empresas (id, nome, cnpj, telefone, email, endereco)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(nome)
    .bind(campo_opcional(body.cnpj.as_deref()))
    .bind(campo_opcional(body.telefone.as_deref()))
    .bind(
        campo_opcional(body.email.as_deref())
            .map(|e| e.to_lowercase()),
    )
    .bind(campo_opcional(body.endereco.as_deref()))
    .execute(state.pool_ref())
    .await
    .map_err(|err| {
        if violacao_de_unicidade(&err) {
            ApiError::conflict("Empresa já cadastrada")
        } else {
            internal("Erro ao criar empresa")(err)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CriarEmpresaResponse {
            mensagem: "Empresa criada".to_string(),
            empresa: RefDto {
                id,
                nome: nome.to_string(),
            },
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioDto {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub tipo: String,
    pub empresa: Option<RefDto>,
    pub criado_em: DateTime<Utc>,
}

/// Active accounts with their company, password hash never included.
pub async fn listar_usuarios(
    State(state): State<AppState>,
    usuario: AuthUser,
) -> Result<Json<Vec<UsuarioDto>>, ApiError> {
    require_admin(&usuario)?;

    let usuarios = sqlx::query_as::<_, UsuarioRow>(
        "SELECT u.id, u.email, u.nome, u.papel, u.empresa_id, u.criado_em,
                e.nome AS empresa_nome
         FROM usuarios u
         LEFT JOIN empresas e ON e.id = u.empresa_id
         WHERE u.status = 'ativo'
         ORDER BY u.criado_em",
    )
    .fetch_all(state.pool_ref())
    .await
    .map_err(internal("Erro ao listar usuários"))?;

    let usuarios = usuarios
        .into_iter()
        .map(|row| UsuarioDto {
            id: row.id,
            email: row.email,
            nome: row.nome,
            tipo: row.papel,
            empresa: match (row.empresa_id, row.empresa_nome) {
                (Some(id), Some(nome)) => Some(RefDto { id, nome }),
                _ => None,
            },
            criado_em: row.criado_em,
        })
        .collect();

    Ok(Json(usuarios))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrocarSenhaRequest {
    pub usuario_id: Option<Uuid>,
    pub nova_senha: Option<String>,
}

/// Administrative reset: always re-hashes and overwrites, no old-password
/// check on this path.
pub async fn trocar_senha(
    State(state): State<AppState>,
    usuario: AuthUser,
    Json(body): Json<TrocarSenhaRequest>,
) -> Result<Json<MensagemDto>, ApiError> {
    require_admin(&usuario)?;

    let (usuario_id, nova_senha) = match (body.usuario_id, body.nova_senha.as_deref()) {
        (Some(id), Some(senha)) if !senha.is_empty() => (id, senha),
        _ => return Err(ApiError::validation("Dados incompletos")),
    };
    if nova_senha.chars().count() < SENHA_MINIMA {
        return Err(ApiError::validation(
            "Senha deve ter no mínimo 3 caracteres",
        ));
    }

    let senha_hash = auth::hash_password(nova_senha).map_err(internal("Erro ao trocar senha"))?;

    let resultado = sqlx::query("UPDATE usuarios SET senha_hash = $2 WHERE id = $1")
        .bind(usuario_id)
        .bind(&senha_hash)
        .execute(state.pool_ref())
        .await
        .map_err(internal("Erro ao trocar senha"))?;

    if resultado.rows_affected() == 0 {
        return Err(ApiError::not_found("Usuário não encontrado"));
    }

    Ok(Json(MensagemDto::new("Senha alterada")))
}

/// Soft deactivation, refusing to remove the last active administrator.
pub async fn desativar_usuario(
    State(state): State<AppState>,
    usuario: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MensagemDto>, ApiError> {
    require_admin(&usuario)?;

    let alvo = sqlx::query_scalar::<_, String>("SELECT papel FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(state.pool_ref())
        .await
        .map_err(internal("Erro ao excluir usuário"))?
        .ok_or_else(|| ApiError::not_found("Usuário não encontrado"))?;

    if alvo == Papel::Admin.as_str() {
        let ativos = contar_admins_ativos(state.pool_ref())
            .await
            .map_err(internal("Erro ao excluir usuário"))?;
        if ativos <= 1 {
            return Err(ApiError::conflict(
                "Não é possível excluir o único administrador ativo",
            ));
        }
    }

    sqlx::query("UPDATE usuarios SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(Status::Desativado.as_str())
        .execute(state.pool_ref())
        .await
        .map_err(internal("Erro ao excluir usuário"))?;

    Ok(Json(MensagemDto::new("Usuário desativado")))
}

async fn contar_admins_ativos(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM usuarios WHERE papel = 'admin' AND status = 'ativo'",
    )
    .fetch_one(pool)
    .await
}

fn campo_opcional(valor: Option<&str>) -> Option<String> {
    valor
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campo_opcional_descarta_vazios() {
        assert_eq!(campo_opcional(None), None);
        assert_eq!(campo_opcional(Some("")), None);
        assert_eq!(campo_opcional(Some("   ")), None);
        assert_eq!(
            campo_opcional(Some(" 43 3123-4567 ")),
            Some("43 3123-4567".to_string())
        );
    }

    #[test]
    fn senha_minima_conta_caracteres() {
        // "né!" has 3 chars but more than 3 bytes; the rule is per character.
        assert!("né!".chars().count() >= SENHA_MINIMA);
        assert!("ab".chars().count() < SENHA_MINIMA);
    }
}
