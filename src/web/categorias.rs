use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::web::{
    AppState,
    auth::{AuthUser, require_admin},
    error::{ApiError, internal, violacao_de_unicidade},
    models::{CategoriaRow, MensagemDto, Status},
};

const COR_PADRAO: &str = "#1976d2";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriaDto {
    pub id: Uuid,
    pub nome: String,
    pub cor: String,
    pub criado_em: DateTime<Utc>,
}

impl From<CategoriaRow> for CategoriaDto {
    fn from(row: CategoriaRow) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            cor: row.cor,
            criado_em: row.criado_em,
        }
    }
}

pub async fn listar(
    State(state): State<AppState>,
    _usuario: AuthUser,
) -> Result<Json<Vec<CategoriaDto>>, ApiError> {
    let categorias = sqlx::query_as::<_, CategoriaRow>(
        "SELECT id, nome, cor, criado_em FROM categorias WHERE status = 'ativo' ORDER BY nome",
    )
    .fetch_all(state.pool_ref())
    .await
    .map_err(internal("Erro ao buscar categorias"))?;

    Ok(Json(categorias.into_iter().map(CategoriaDto::from).collect()))
}

#[derive(Deserialize)]
pub struct CriarCategoriaRequest {
    pub nome: Option<String>,
    pub cor: Option<String>,
}

pub async fn criar(
    State(state): State<AppState>,
    usuario: AuthUser,
    Json(body): Json<CriarCategoriaRequest>,
) -> Result<(StatusCode, Json<CategoriaDto>), ApiError> {
    require_admin(&usuario)?;

    let nome = body.nome.as_deref().map(str::trim).unwrap_or_default();
    if nome.is_empty() {
        return Err(ApiError::validation("Nome é obrigatório"));
    }
    let cor = body
        .cor
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(COR_PADRAO);

    let criada = sqlx::query_as::<_, CategoriaRow>(
        "INSERT INTO categorias (id, nome, cor) VALUES ($1, $2, $3)
         RETURNING id, nome, cor, criado_em",
    )
    .bind(Uuid::new_v4())
    .bind(nome)
    .bind(cor)
    .fetch_one(state.pool_ref())
    .await
    .map_err(|err| {
        if violacao_de_unicidade(&err) {
            ApiError::conflict("Categoria já existe")
        } else {
            internal("Erro ao criar categoria")(err)
        }
    })?;

    Ok((StatusCode::CREATED, Json(CategoriaDto::from(criada))))
}

pub async fn remover(
    State(state): State<AppState>,
    usuario: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MensagemDto>, ApiError> {
    require_admin(&usuario)?;

    sqlx::query("UPDATE categorias SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(Status::Desativado.as_str())
        .execute(state.pool_ref())
        .await
        .map_err(internal("Erro ao remover categoria"))?;

    Ok(Json(MensagemDto::new("Categoria removida")))
}
