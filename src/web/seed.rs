use axum::{Json, extract::State};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::web::{
    AppState,
    auth,
    error::{ApiError, internal},
    models::MensagemDto,
};

/// Shared password of the demo accounts.
const SENHA_DEMO: &str = "123";

/// Destructive demo bootstrap: wipes every collection and repopulates fixed
/// data. Only reachable outside production; the route answers 404 there.
pub async fn executar(State(state): State<AppState>) -> Result<Json<MensagemDto>, ApiError> {
    if !state.config().seed_enabled() {
        return Err(ApiError::not_found("Não encontrado"));
    }

    popular(state.pool_ref())
        .await
        .map_err(internal("Erro ao criar dados"))?;

    info!("dados de demonstração recriados");
    Ok(Json(MensagemDto::new("Dados iniciais criados!")))
}

async fn popular(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "TRUNCATE exame_historico, exame_arquivos, exames, usuarios, categorias, empresas",
    )
    .execute(&mut *tx)
    .await?;

    let empresas = [
        ("Clínica X", "12.345.678/0001-00"),
        ("Lab Saúde", "98.765.432/0001-00"),
        ("Hospital Central", "11.222.333/0001-00"),
    ];
    let mut empresa_ids = Vec::new();
    for (nome, cnpj) in empresas {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO empresas (id, nome, cnpj) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(nome)
            .bind(cnpj)
            .execute(&mut *tx)
            .await?;
        empresa_ids.push(id);
    }

    let categorias = [
        ("USG Mamas", "#e91e63"),
        ("USG Articulação", "#2196f3"),
        ("USG Tireoide", "#4caf50"),
        ("Raio-X", "#ff9800"),
        ("Tomografia", "#9c27b0"),
        ("Ressonância", "#00bcd4"),
    ];
    for (nome, cor) in categorias {
        sqlx::query("INSERT INTO categorias (id, nome, cor) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(nome)
            .bind(cor)
            .execute(&mut *tx)
            .await?;
    }

    let senha_hash = auth::hash_password(SENHA_DEMO)?;
    let contas: [(&str, &str, &str, Option<Uuid>); 3] = [
        ("admin@cismepar.com", "Administrador CISMEPAR", "admin", None),
        ("user@clinicax.com", "Maria Silva", "empresa", Some(empresa_ids[0])),
        ("user@labsaude.com", "João Santos", "empresa", Some(empresa_ids[1])),
    ];
    for (email, nome, papel, empresa_id) in contas {
        sqlx::query(
            "INSERT INTO usuarios (id, email, senha_hash, nome, papel, empresa_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&senha_hash)
        .bind(nome)
        .bind(papel)
        .bind(empresa_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
