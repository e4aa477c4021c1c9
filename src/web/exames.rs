use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use crate::{
    filesig::{self, TipoArquivo},
    web::{
        AppState,
        auth::{self, AuthUser, require_admin, verificar_propriedade},
        error::{ApiError, internal},
        models::{
            ArquivoDto, ArquivoRow, CategoriaRefDto, ExameDto, ExameRow, HistoricoDto,
            HistoricoRow, MensagemDto, RefDto, Status, TipoUpload,
        },
        uploads::{FileFieldConfig, FormUpload, UploadedFile, collect_form},
    },
};

/// Listing cap; the client narrows further with its own filters.
const LIMITE_LISTAGEM: i64 = 500;

pub const MAX_UPLOAD_INDIVIDUAL: usize = 10 * 1024 * 1024;
pub const MAX_UPLOAD_MASSIVO: usize = 50 * 1024 * 1024;
pub const MAX_ARQUIVOS_MASSIVO: usize = 100;

const SELECT_EXAMES: &str = "SELECT x.id, x.paciente, x.mes, x.ano, x.data, x.observacoes, \
            x.data_envio, x.tipo_upload, x.lote, \
            c.id AS categoria_id, c.nome AS categoria_nome, c.cor AS categoria_cor, \
            e.id AS empresa_id, e.nome AS empresa_nome, \
            u.id AS enviado_por_id, u.nome AS enviado_por_nome \
     FROM exames x \
     JOIN categorias c ON c.id = x.categoria_id \
     JOIN empresas e ON e.id = x.empresa_id \
     JOIN usuarios u ON u.id = x.enviado_por";

#[derive(Default)]
struct FiltroExames {
    ids: Option<Vec<Uuid>>,
    empresa: Option<Uuid>,
    categoria: Option<Uuid>,
    mes: Option<String>,
    ano: Option<i32>,
}

#[derive(Deserialize)]
pub struct ListarExamesQuery {
    pub categoria: Option<Uuid>,
    pub mes: Option<String>,
    pub ano: Option<i32>,
    pub empresa: Option<Uuid>,
}

/// Tenant-scoped listing: company users are always pinned to their own
/// company; administrators may filter by any company or none.
pub async fn listar(
    State(state): State<AppState>,
    usuario: AuthUser,
    Query(query): Query<ListarExamesQuery>,
) -> Result<Json<Vec<ExameDto>>, ApiError> {
    let empresa = if usuario.is_admin() {
        query.empresa
    } else {
        Some(
            usuario
                .empresa
                .ok_or_else(|| ApiError::forbidden("Sem permissão"))?,
        )
    };

    let filtro = FiltroExames {
        ids: None,
        empresa,
        categoria: query.categoria,
        mes: query.mes,
        ano: query.ano,
    };

    let exames = carregar_exames(state.pool_ref(), &filtro)
        .await
        .map_err(internal("Erro ao buscar exames"))?;

    Ok(Json(exames))
}

pub async fn criar(
    State(state): State<AppState>,
    usuario: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ExameDto>), ApiError> {
    let form = collect_form(
        multipart,
        FileFieldConfig {
            field_name: "pdf",
            max_files: 1,
            max_file_size: MAX_UPLOAD_INDIVIDUAL,
        },
    )
    .await
    .map_err(|err| ApiError::validation(err.message()))?;

    let arquivo = form
        .files
        .first()
        .ok_or_else(|| ApiError::validation("Arquivo não enviado"))?;

    let categoria = campo_uuid(&form, "categoria")?;
    let mes = campo_obrigatorio(&form, "mes")?.to_string();
    let ano = campo_ano(&form)?;
    let data = parse_data(campo_obrigatorio(&form, "data")?)
        .ok_or_else(|| ApiError::validation("Data inválida"))?;
    let empresa = empresa_alvo(&usuario, form.field("empresa"))?;
    let paciente = form.field("paciente").map(str::trim).unwrap_or_default();
    let observacoes = form
        .field("observacoes")
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string);

    if !filesig::conteudo_corresponde(&arquivo.bytes, &arquivo.content_type) {
        return Err(ApiError::validation("Arquivo inválido ou corrompido"));
    }

    let exame_id = persistir_exame(
        &state,
        NovoExame {
            paciente: paciente.to_string(),
            categoria,
            mes,
            ano,
            data,
            observacoes,
            empresa,
            enviado_por: usuario.id,
            tipo_upload: TipoUpload::Individual,
            lote: None,
            acao: "Criou o exame",
        },
        arquivo,
    )
    .await?;

    let exame = carregar_por_id(state.pool_ref(), exame_id)
        .await
        .map_err(internal("Erro ao criar exame"))?
        .ok_or_else(|| ApiError::Internal("Erro ao criar exame".to_string()))?;

    Ok((StatusCode::CREATED, Json(exame)))
}

#[derive(Serialize)]
pub struct MassivoResponse {
    pub mensagem: String,
    pub ignorados: usize,
    pub exames: Vec<ExameDto>,
}

/// Bulk upload: each file stands alone. A file failing signature validation
/// is skipped and counted; it never aborts the rest of the batch.
pub async fn criar_massivo(
    State(state): State<AppState>,
    usuario: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MassivoResponse>), ApiError> {
    let form = collect_form(
        multipart,
        FileFieldConfig {
            field_name: "arquivos",
            max_files: MAX_ARQUIVOS_MASSIVO,
            max_file_size: MAX_UPLOAD_MASSIVO,
        },
    )
    .await
    .map_err(|err| ApiError::validation(err.message()))?;

    if form.files.is_empty() {
        return Err(ApiError::validation("Nenhum arquivo enviado"));
    }

    let categoria = campo_uuid(&form, "categoria")?;
    let mes = campo_obrigatorio(&form, "mes")?.to_string();
    let ano = campo_ano(&form)?;
    let empresa = empresa_alvo(&usuario, form.field("empresa"))?;
    let lote = form
        .field("lote")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let paciente = match &lote {
        Some(lote) => format!("Lote: {lote}"),
        None => "Upload Massivo".to_string(),
    };

    let mut criados: Vec<Uuid> = Vec::new();
    let mut ignorados = 0usize;

    for arquivo in &form.files {
        if !filesig::conteudo_corresponde(&arquivo.bytes, &arquivo.content_type) {
            warn!(arquivo = %arquivo.original_name, "arquivo ignorado no upload massivo");
            ignorados += 1;
            continue;
        }

        let exame_id = persistir_exame(
            &state,
            NovoExame {
                paciente: paciente.clone(),
                categoria,
                mes: mes.clone(),
                ano,
                data: Utc::now(),
                observacoes: None,
                empresa,
                enviado_por: usuario.id,
                tipo_upload: TipoUpload::Massivo,
                lote: lote.clone(),
                acao: "Criou via upload massivo",
            },
            arquivo,
        )
        .await?;

        criados.push(exame_id);
    }

    let exames = carregar_por_ids(state.pool_ref(), &criados)
        .await
        .map_err(internal("Erro no upload massivo"))?;

    Ok((
        StatusCode::CREATED,
        Json(MassivoResponse {
            mensagem: format!("{} exame(s) criado(s)", exames.len()),
            ignorados,
            exames,
        }),
    ))
}

#[derive(Deserialize)]
pub struct AtualizarExameRequest {
    pub paciente: Option<String>,
    pub categoria: Option<Uuid>,
    pub mes: Option<String>,
    pub ano: Option<i32>,
    pub data: Option<String>,
    pub observacoes: Option<String>,
}

/// Partial update. One history entry is appended per call, before any field
/// change, so the log records the edit intent even when nothing changes.
pub async fn atualizar(
    State(state): State<AppState>,
    usuario: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AtualizarExameRequest>,
) -> Result<Json<ExameDto>, ApiError> {
    let empresa_do_exame = buscar_empresa_do_exame(state.pool_ref(), id)
        .await
        .map_err(internal("Erro ao editar exame"))?
        .ok_or_else(|| ApiError::not_found("Exame não encontrado"))?;

    verificar_propriedade(usuario.tipo, usuario.empresa, empresa_do_exame)?;

    let data = match body.data.as_deref() {
        Some(valor) => {
            Some(parse_data(valor).ok_or_else(|| ApiError::validation("Data inválida"))?)
        }
        None => None,
    };

    let mut tx = state
        .pool_ref()
        .begin()
        .await
        .map_err(internal("Erro ao editar exame"))?;

    sqlx::query("INSERT INTO exame_historico (exame_id, usuario_id, acao) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(usuario.id)
        .bind("Editou o exame")
        .execute(&mut *tx)
        .await
        .map_err(internal("Erro ao editar exame"))?;

    montar_update(id, &body, data)
        .build()
        .execute(&mut *tx)
        .await
        .map_err(internal("Erro ao editar exame"))?;

    tx.commit().await.map_err(internal("Erro ao editar exame"))?;

    let exame = carregar_por_id(state.pool_ref(), id)
        .await
        .map_err(internal("Erro ao editar exame"))?
        .ok_or_else(|| ApiError::not_found("Exame não encontrado"))?;

    Ok(Json(exame))
}

pub async fn excluir(
    State(state): State<AppState>,
    usuario: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MensagemDto>, ApiError> {
    require_admin(&usuario)?;

    let resultado = sqlx::query(
        "UPDATE exames SET status = $2, atualizado_em = NOW() WHERE id = $1 AND status = 'ativo'",
    )
    .bind(id)
    .bind(Status::Desativado.as_str())
    .execute(state.pool_ref())
    .await
    .map_err(internal("Erro ao excluir exame"))?;

    if resultado.rows_affected() == 0 {
        return Err(ApiError::not_found("Exame não encontrado"));
    }

    Ok(Json(MensagemDto::new("Exame excluído")))
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ArquivoDownloadRow {
    nome_original: String,
    tipo: String,
    blob_id: Uuid,
}

/// File download. The token may arrive in the `Authorization` header or —
/// only here — as a `?token=` query parameter, so the client can open the
/// file in a new browser tab where headers cannot be set.
pub async fn baixar_arquivo(
    State(state): State<AppState>,
    Path((exame_id, arquivo_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = auth::bearer_do_header(headers.get(header::AUTHORIZATION))
        .map(str::to_string)
        .or(query.token)
        .ok_or_else(|| ApiError::unauthenticated("Token não fornecido"))?;

    let claims = auth::decodificar_token(&state.config().jwt_secret, &token)?;

    let empresa_do_exame = buscar_empresa_do_exame(state.pool_ref(), exame_id)
        .await
        .map_err(internal("Erro ao buscar arquivo"))?
        .ok_or_else(|| ApiError::not_found("Exame não encontrado"))?;

    verificar_propriedade(claims.tipo, claims.empresa, empresa_do_exame)?;

    let arquivo = sqlx::query_as::<_, ArquivoDownloadRow>(
        "SELECT nome_original, tipo, blob_id FROM exame_arquivos
         WHERE id = $1 AND exame_id = $2",
    )
    .bind(arquivo_id)
    .bind(exame_id)
    .fetch_optional(state.pool_ref())
    .await
    .map_err(internal("Erro ao buscar arquivo"))?
    .ok_or_else(|| ApiError::not_found("Arquivo não encontrado"))?;

    let bytes = state
        .files()
        .read(arquivo.blob_id)
        .await
        .map_err(internal("Erro ao buscar arquivo"))?;

    let content_type = TipoArquivo::do_registro(&arquivo.tipo).content_type();

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type.as_ref())
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!(
        "inline; filename=\"{}\"",
        arquivo.nome_original.replace('"', "")
    );
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).unwrap_or(HeaderValue::from_static("inline")),
    );

    Ok((response_headers, bytes).into_response())
}

struct NovoExame {
    paciente: String,
    categoria: Uuid,
    mes: String,
    ano: i32,
    data: DateTime<Utc>,
    observacoes: Option<String>,
    empresa: Uuid,
    enviado_por: Uuid,
    tipo_upload: TipoUpload,
    lote: Option<String>,
    acao: &'static str,
}

/// Writes the blob, then creates the exam record (exam + file + first
/// history entry) in one transaction. If the insert fails after the blob
/// write succeeded, the blob is orphaned on disk; there is no compensating
/// delete.
async fn persistir_exame(
    state: &AppState,
    novo: NovoExame,
    arquivo: &UploadedFile,
) -> Result<Uuid, ApiError> {
    let blob_id = Uuid::new_v4();
    state
        .files()
        .save(blob_id, &arquivo.bytes)
        .await
        .map_err(internal("Erro ao gravar arquivo"))?;

    let exame_id = Uuid::new_v4();
    let tipo = TipoArquivo::do_mime(&arquivo.content_type);

    let mut tx = state
        .pool_ref()
        .begin()
        .await
        .map_err(internal("Erro ao criar exame"))?;

    sqlx::query(
        "INSERT INTO exames (id, paciente, categoria_id, mes, ano, data, observacoes,
                             empresa_id, enviado_por, tipo_upload, lote)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(exame_id)
    .bind(&novo.paciente)
    .bind(novo.categoria)
    .bind(&novo.mes)
    .bind(novo.ano)
    .bind(novo.data)
    .bind(&novo.observacoes)
    .bind(novo.empresa)
    .bind(novo.enviado_por)
    .bind(novo.tipo_upload.as_str())
    .bind(&novo.lote)
    .execute(&mut *tx)
    .await
    .map_err(|err| mapear_erro_de_referencia(err, "Erro ao criar exame"))?;

    sqlx::query(
        "INSERT INTO exame_arquivos (id, exame_id, nome_original, nome_armazenado,
                                     tipo, tamanho, blob_id, posicao)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 0)",
    )
    .bind(Uuid::new_v4())
    .bind(exame_id)
    .bind(&arquivo.original_name)
    .bind(&arquivo.stored_name)
    .bind(tipo.as_str())
    .bind(arquivo.bytes.len() as i64)
    .bind(blob_id)
    .execute(&mut *tx)
    .await
    .map_err(internal("Erro ao criar exame"))?;

    sqlx::query("INSERT INTO exame_historico (exame_id, usuario_id, acao) VALUES ($1, $2, $3)")
        .bind(exame_id)
        .bind(novo.enviado_por)
        .bind(novo.acao)
        .execute(&mut *tx)
        .await
        .map_err(internal("Erro ao criar exame"))?;

    tx.commit().await.map_err(internal("Erro ao criar exame"))?;

    Ok(exame_id)
}

/// A broken categoria/empresa reference is a caller mistake, not a server
/// fault.
fn mapear_erro_de_referencia(err: sqlx::Error, mensagem: &'static str) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            ApiError::validation("Categoria ou empresa inexistente")
        }
        _ => internal(mensagem)(err),
    }
}

async fn buscar_empresa_do_exame(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>("SELECT empresa_id FROM exames WHERE id = $1 AND status = 'ativo'")
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn campo_obrigatorio<'a>(form: &'a FormUpload, nome: &str) -> Result<&'a str, ApiError> {
    form.field(nome)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("Campos obrigatórios faltando"))
}

fn campo_uuid(form: &FormUpload, nome: &str) -> Result<Uuid, ApiError> {
    campo_obrigatorio(form, nome)?
        .parse()
        .map_err(|_| ApiError::validation("Campos obrigatórios faltando"))
}

fn campo_ano(form: &FormUpload) -> Result<i32, ApiError> {
    campo_obrigatorio(form, "ano")?
        .parse()
        .map_err(|_| ApiError::validation("Ano inválido"))
}

/// Company the new exam belongs to: administrators must name one; company
/// users always write into their own.
fn empresa_alvo(usuario: &AuthUser, campo: Option<&str>) -> Result<Uuid, ApiError> {
    if usuario.is_admin() {
        campo
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ApiError::validation("Empresa é obrigatória"))
    } else {
        usuario
            .empresa
            .ok_or_else(|| ApiError::forbidden("Sem permissão"))
    }
}

fn parse_data(valor: &str) -> Option<DateTime<Utc>> {
    if let Ok(dia) = NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
        return Utc
            .from_local_datetime(&dia.and_hms_opt(0, 0, 0)?)
            .single();
    }
    DateTime::parse_from_rfc3339(valor)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn montar_update<'a>(
    id: Uuid,
    body: &'a AtualizarExameRequest,
    data: Option<DateTime<Utc>>,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE exames SET atualizado_em = NOW()");

    if let Some(paciente) = body.paciente.as_deref() {
        qb.push(", paciente = ").push_bind(paciente.trim());
    }
    if let Some(categoria) = body.categoria {
        qb.push(", categoria_id = ").push_bind(categoria);
    }
    if let Some(mes) = body.mes.as_deref() {
        qb.push(", mes = ").push_bind(mes.trim());
    }
    if let Some(ano) = body.ano {
        qb.push(", ano = ").push_bind(ano);
    }
    if let Some(data) = data {
        qb.push(", data = ").push_bind(data);
    }
    // Unlike the other fields, observacoes also accepts an explicit empty
    // value to clear the notes.
    if let Some(observacoes) = body.observacoes.as_deref() {
        qb.push(", observacoes = ").push_bind(observacoes.trim());
    }

    qb.push(" WHERE id = ").push_bind(id);
    qb
}

fn montar_listagem(filtro: &FiltroExames) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_EXAMES);
    qb.push(" WHERE x.status = 'ativo'");

    if let Some(ids) = &filtro.ids {
        qb.push(" AND x.id = ANY(").push_bind(ids.clone()).push(")");
    }
    if let Some(empresa) = filtro.empresa {
        qb.push(" AND x.empresa_id = ").push_bind(empresa);
    }
    if let Some(categoria) = filtro.categoria {
        qb.push(" AND x.categoria_id = ").push_bind(categoria);
    }
    if let Some(mes) = &filtro.mes {
        qb.push(" AND x.mes = ").push_bind(mes.clone());
    }
    if let Some(ano) = filtro.ano {
        qb.push(" AND x.ano = ").push_bind(ano);
    }

    qb.push(" ORDER BY x.data_envio DESC LIMIT ");
    qb.push_bind(LIMITE_LISTAGEM);
    qb
}

async fn carregar_exames(pool: &PgPool, filtro: &FiltroExames) -> sqlx::Result<Vec<ExameDto>> {
    let rows: Vec<ExameRow> = montar_listagem(filtro).build_query_as().fetch_all(pool).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let arquivos = sqlx::query_as::<_, ArquivoRow>(
        "SELECT id, exame_id, nome_original, nome_armazenado, tipo, tamanho, blob_id
         FROM exame_arquivos WHERE exame_id = ANY($1)
         ORDER BY exame_id, posicao",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let historico = sqlx::query_as::<_, HistoricoRow>(
        "SELECT h.exame_id, h.data, h.acao, u.id AS usuario_id, u.nome AS usuario_nome
         FROM exame_historico h
         LEFT JOIN usuarios u ON u.id = h.usuario_id
         WHERE h.exame_id = ANY($1)
         ORDER BY h.id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    Ok(montar_exames(rows, arquivos, historico))
}

async fn carregar_por_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<ExameDto>> {
    Ok(carregar_por_ids(pool, &[id]).await?.into_iter().next())
}

async fn carregar_por_ids(pool: &PgPool, ids: &[Uuid]) -> sqlx::Result<Vec<ExameDto>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let filtro = FiltroExames {
        ids: Some(ids.to_vec()),
        ..FiltroExames::default()
    };
    carregar_exames(pool, &filtro).await
}

fn montar_exames(
    rows: Vec<ExameRow>,
    arquivos: Vec<ArquivoRow>,
    historico: Vec<HistoricoRow>,
) -> Vec<ExameDto> {
    let mut arquivos_por_exame: HashMap<Uuid, Vec<ArquivoDto>> = HashMap::new();
    for arquivo in arquivos {
        arquivos_por_exame
            .entry(arquivo.exame_id)
            .or_default()
            .push(ArquivoDto {
                id: arquivo.id,
                nome_original: arquivo.nome_original,
                nome_armazenado: arquivo.nome_armazenado,
                tipo: arquivo.tipo,
                tamanho: arquivo.tamanho,
            });
    }

    let mut historico_por_exame: HashMap<Uuid, Vec<HistoricoDto>> = HashMap::new();
    for entrada in historico {
        let usuario = match (entrada.usuario_id, entrada.usuario_nome) {
            (Some(id), Some(nome)) => Some(RefDto { id, nome }),
            _ => None,
        };
        historico_por_exame
            .entry(entrada.exame_id)
            .or_default()
            .push(HistoricoDto {
                usuario,
                data: entrada.data,
                acao: entrada.acao,
            });
    }

    rows.into_iter()
        .map(|row| ExameDto {
            id: row.id,
            paciente: row.paciente,
            categoria: CategoriaRefDto {
                id: row.categoria_id,
                nome: row.categoria_nome,
                cor: row.categoria_cor,
            },
            mes: row.mes,
            ano: row.ano,
            data: row.data,
            observacoes: row.observacoes,
            empresa: RefDto {
                id: row.empresa_id,
                nome: row.empresa_nome,
            },
            enviado_por: RefDto {
                id: row.enviado_por_id,
                nome: row.enviado_por_nome,
            },
            data_envio: row.data_envio,
            arquivos: arquivos_por_exame.remove(&row.id).unwrap_or_default(),
            tipo_upload: row.tipo_upload,
            lote: row.lote,
            historico: historico_por_exame.remove(&row.id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_aceita_data_simples_e_rfc3339() {
        let dia = parse_data("2024-05-10").unwrap();
        assert_eq!(dia.to_rfc3339(), "2024-05-10T00:00:00+00:00");

        let completo = parse_data("2024-05-10T13:45:00Z").unwrap();
        assert_eq!(completo.to_rfc3339(), "2024-05-10T13:45:00+00:00");

        assert!(parse_data("10/05/2024").is_none());
        assert!(parse_data("").is_none());
    }

    #[test]
    fn atualizacao_distingue_campo_ausente_de_vazio() {
        let vazio: AtualizarExameRequest = serde_json::from_str("{}").unwrap();
        assert!(vazio.observacoes.is_none());

        let limpando: AtualizarExameRequest =
            serde_json::from_str(r#"{"observacoes": ""}"#).unwrap();
        assert_eq!(limpando.observacoes.as_deref(), Some(""));
    }

    #[test]
    fn update_so_inclui_campos_presentes() {
        let body: AtualizarExameRequest =
            serde_json::from_str(r#"{"paciente": "Maria", "observacoes": ""}"#).unwrap();
        let sql = montar_update(Uuid::new_v4(), &body, None).into_sql();

        assert!(sql.contains("paciente ="));
        assert!(sql.contains("observacoes ="));
        assert!(!sql.contains("mes ="));
        assert!(!sql.contains("ano ="));
        assert!(!sql.contains("categoria_id ="));
    }

    #[test]
    fn listagem_sempre_filtra_ativos_e_limita() {
        let sql = montar_listagem(&FiltroExames::default()).into_sql();
        assert!(sql.contains("WHERE x.status = 'ativo'"));
        assert!(sql.contains("ORDER BY x.data_envio DESC LIMIT"));
        assert!(!sql.contains("empresa_id ="));
    }

    #[test]
    fn listagem_compoe_o_filtro_de_empresa_com_os_demais() {
        let filtro = FiltroExames {
            ids: None,
            empresa: Some(Uuid::new_v4()),
            categoria: Some(Uuid::new_v4()),
            mes: Some("Janeiro".to_string()),
            ano: Some(2024),
        };
        let sql = montar_listagem(&filtro).into_sql();
        assert!(sql.contains("AND x.empresa_id ="));
        assert!(sql.contains("AND x.categoria_id ="));
        assert!(sql.contains("AND x.mes ="));
        assert!(sql.contains("AND x.ano ="));
    }

    #[test]
    fn update_sem_campos_so_toca_atualizado_em() {
        let body: AtualizarExameRequest = serde_json::from_str("{}").unwrap();
        let sql = montar_update(Uuid::new_v4(), &body, None).into_sql();
        assert!(sql.starts_with("UPDATE exames SET atualizado_em = NOW() WHERE id ="));
    }

    fn exame_row(id: Uuid) -> ExameRow {
        ExameRow {
            id,
            paciente: "Paciente".into(),
            mes: "Janeiro".into(),
            ano: 2024,
            data: Utc::now(),
            observacoes: None,
            data_envio: Utc::now(),
            tipo_upload: "individual".into(),
            lote: None,
            categoria_id: Uuid::new_v4(),
            categoria_nome: "Raio-X".into(),
            categoria_cor: "#ff9800".into(),
            empresa_id: Uuid::new_v4(),
            empresa_nome: "Clínica X".into(),
            enviado_por_id: Uuid::new_v4(),
            enviado_por_nome: "Maria".into(),
        }
    }

    #[test]
    fn montagem_agrupa_arquivos_e_historico_por_exame() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let usuario = Uuid::new_v4();

        let arquivos = vec![
            ArquivoRow {
                id: Uuid::new_v4(),
                exame_id: a,
                nome_original: "laudo.pdf".into(),
                nome_armazenado: "laudo.pdf".into(),
                tipo: "pdf".into(),
                tamanho: 10,
                blob_id: Uuid::new_v4(),
            },
            ArquivoRow {
                id: Uuid::new_v4(),
                exame_id: b,
                nome_original: "foto.png".into(),
                nome_armazenado: "foto.png".into(),
                tipo: "imagem".into(),
                tamanho: 20,
                blob_id: Uuid::new_v4(),
            },
        ];
        let historico = vec![
            HistoricoRow {
                exame_id: a,
                data: Utc::now(),
                acao: "Criou o exame".into(),
                usuario_id: Some(usuario),
                usuario_nome: Some("Maria".into()),
            },
            HistoricoRow {
                exame_id: a,
                data: Utc::now(),
                acao: "Editou o exame".into(),
                usuario_id: None,
                usuario_nome: None,
            },
        ];

        let exames = montar_exames(vec![exame_row(a), exame_row(b)], arquivos, historico);
        assert_eq!(exames.len(), 2);

        let primeiro = &exames[0];
        assert_eq!(primeiro.id, a);
        assert_eq!(primeiro.arquivos.len(), 1);
        assert_eq!(primeiro.arquivos[0].tipo, "pdf");
        assert_eq!(primeiro.historico.len(), 2);
        assert_eq!(primeiro.historico[0].acao, "Criou o exame");
        assert!(primeiro.historico[1].usuario.is_none());

        let segundo = &exames[1];
        assert_eq!(segundo.arquivos[0].nome_original, "foto.png");
        assert!(segundo.historico.is_empty());
    }
}
