use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of every entity. "Deletion" moves a row to `Desativado`;
/// list/read paths only ever see `Ativo` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ativo,
    Desativado,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ativo => "ativo",
            Status::Desativado => "desativado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Papel {
    Admin,
    Empresa,
}

impl Papel {
    pub fn parse(valor: &str) -> Option<Self> {
        match valor {
            "admin" => Some(Papel::Admin),
            "empresa" => Some(Papel::Empresa),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Papel::Admin => "admin",
            Papel::Empresa => "empresa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoUpload {
    Individual,
    Massivo,
}

impl TipoUpload {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoUpload::Individual => "individual",
            TipoUpload::Massivo => "massivo",
        }
    }
}

#[derive(Clone, FromRow)]
pub struct UsuarioRow {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub papel: String,
    pub empresa_id: Option<Uuid>,
    pub empresa_nome: Option<String>,
    pub criado_em: DateTime<Utc>,
}

#[derive(Clone, FromRow)]
pub struct CategoriaRow {
    pub id: Uuid,
    pub nome: String,
    pub cor: String,
    pub criado_em: DateTime<Utc>,
}

/// Flattened exam listing row; file and history collections are fetched
/// separately and grouped by exam id.
#[derive(Clone, FromRow)]
pub struct ExameRow {
    pub id: Uuid,
    pub paciente: String,
    pub mes: String,
    pub ano: i32,
    pub data: DateTime<Utc>,
    pub observacoes: Option<String>,
    pub data_envio: DateTime<Utc>,
    pub tipo_upload: String,
    pub lote: Option<String>,
    pub categoria_id: Uuid,
    pub categoria_nome: String,
    pub categoria_cor: String,
    pub empresa_id: Uuid,
    pub empresa_nome: String,
    pub enviado_por_id: Uuid,
    pub enviado_por_nome: String,
}

#[derive(Clone, FromRow)]
pub struct ArquivoRow {
    pub id: Uuid,
    pub exame_id: Uuid,
    pub nome_original: String,
    pub nome_armazenado: String,
    pub tipo: String,
    pub tamanho: i64,
    pub blob_id: Uuid,
}

#[derive(Clone, FromRow)]
pub struct HistoricoRow {
    pub exame_id: Uuid,
    pub data: DateTime<Utc>,
    pub acao: String,
    pub usuario_id: Option<Uuid>,
    pub usuario_nome: Option<String>,
}

/// `{id, nome}` reference embedded in exam responses.
#[derive(Debug, Clone, Serialize)]
pub struct RefDto {
    pub id: Uuid,
    pub nome: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriaRefDto {
    pub id: Uuid,
    pub nome: String,
    pub cor: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArquivoDto {
    pub id: Uuid,
    pub nome_original: String,
    pub nome_armazenado: String,
    pub tipo: String,
    pub tamanho: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoricoDto {
    pub usuario: Option<RefDto>,
    pub data: DateTime<Utc>,
    pub acao: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExameDto {
    pub id: Uuid,
    pub paciente: String,
    pub categoria: CategoriaRefDto,
    pub mes: String,
    pub ano: i32,
    pub data: DateTime<Utc>,
    pub observacoes: Option<String>,
    pub empresa: RefDto,
    pub enviado_por: RefDto,
    pub data_envio: DateTime<Utc>,
    pub arquivos: Vec<ArquivoDto>,
    pub tipo_upload: String,
    pub lote: Option<String>,
    pub historico: Vec<HistoricoDto>,
}

/// Simple `{mensagem}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MensagemDto {
    pub mensagem: String,
}

impl MensagemDto {
    pub fn new(mensagem: impl Into<String>) -> Self {
        Self {
            mensagem: mensagem.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn papel_parse_e_as_str() {
        assert_eq!(Papel::parse("admin"), Some(Papel::Admin));
        assert_eq!(Papel::parse("empresa"), Some(Papel::Empresa));
        assert_eq!(Papel::parse("gerente"), None);
        assert_eq!(Papel::Admin.as_str(), "admin");
    }

    #[test]
    fn serializacao_dos_enums() {
        assert_eq!(serde_json::to_string(&Papel::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Status::Ativo).unwrap(), "\"ativo\"");
        assert_eq!(
            serde_json::to_string(&TipoUpload::Massivo).unwrap(),
            "\"massivo\""
        );
    }
}
