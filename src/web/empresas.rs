use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::web::{
    AppState,
    auth::AuthUser,
    error::{ApiError, internal},
};

#[derive(Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaComContagem {
    pub id: Uuid,
    pub nome: String,
    pub total_exames: i64,
}

/// Administrators see every active company; company users see a
/// single-element list with their own. Both come annotated with the live
/// count of active exams.
pub async fn listar(
    State(state): State<AppState>,
    usuario: AuthUser,
) -> Result<Json<Vec<EmpresaComContagem>>, ApiError> {
    let empresas = if usuario.is_admin() {
        listar_todas(state.pool_ref())
            .await
            .map_err(internal("Erro ao buscar empresas"))?
    } else {
        let empresa_id = usuario
            .empresa
            .ok_or_else(|| ApiError::forbidden("Sem permissão"))?;
        listar_uma(state.pool_ref(), empresa_id)
            .await
            .map_err(internal("Erro ao buscar empresas"))?
    };

    Ok(Json(empresas))
}

async fn listar_todas(pool: &PgPool) -> sqlx::Result<Vec<EmpresaComContagem>> {
    sqlx::query_as::<_, EmpresaComContagem>(
        "SELECT e.id, e.nome,
                COUNT(x.id) FILTER (WHERE x.status = 'ativo') AS total_exames
         FROM empresas e
         LEFT JOIN exames x ON x.empresa_id = e.id
         WHERE e.status = 'ativo'
         GROUP BY e.id, e.nome
         ORDER BY e.nome",
    )
    .fetch_all(pool)
    .await
}

async fn listar_uma(pool: &PgPool, empresa_id: Uuid) -> sqlx::Result<Vec<EmpresaComContagem>> {
    sqlx::query_as::<_, EmpresaComContagem>(
        "SELECT e.id, e.nome,
                COUNT(x.id) FILTER (WHERE x.status = 'ativo') AS total_exames
         FROM empresas e
         LEFT JOIN exames x ON x.empresa_id = e.id
         WHERE e.id = $1 AND e.status = 'ativo'
         GROUP BY e.id, e.nome",
    )
    .bind(empresa_id)
    .fetch_all(pool)
    .await
}
