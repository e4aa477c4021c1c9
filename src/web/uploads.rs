use std::{collections::HashMap, path::Path};

use axum::extract::Multipart;

/// Result type used by the multipart helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error returned while reading or validating a multipart form.
#[derive(Debug)]
pub struct UploadError {
    message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UploadError {}

/// Extensions the portal accepts at the transport layer. Content is still
/// signature-checked before anything is persisted.
const EXTENSOES_PERMITIDAS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Expectations for the single file field of a multipart form.
#[derive(Debug, Clone, Copy)]
pub struct FileFieldConfig<'a> {
    pub field_name: &'a str,
    pub max_files: usize,
    pub max_file_size: usize,
}

/// One uploaded file, held in memory until it passes signature validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub stored_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form: uploaded files plus plain text fields.
#[derive(Debug, Default)]
pub struct FormUpload {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl FormUpload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reads the whole multipart form into memory, enforcing the field name,
/// file count, per-file size cap, and the extension/MIME allowlist.
pub async fn collect_form(
    mut multipart: Multipart,
    config: FileFieldConfig<'_>,
) -> UploadResult<FormUpload> {
    let mut form = FormUpload::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::new(format!("Erro ao ler o formulário: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field.file_name().is_none() {
            let value = field.text().await.map_err(|err| {
                UploadError::new(format!("Erro ao ler o campo `{field_name}`: {err}"))
            })?;
            form.fields.insert(field_name, value);
            continue;
        }

        if field_name != config.field_name {
            return Err(UploadError::new(format!(
                "Campo de arquivo não suportado: `{field_name}`"
            )));
        }

        if form.files.len() >= config.max_files {
            return Err(UploadError::new(format!(
                "Número máximo de arquivos excedido (máximo {})",
                config.max_files
            )));
        }

        let original_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();

        if !tipo_permitido(&original_name, &content_type) {
            return Err(UploadError::new("Tipo de arquivo não permitido"));
        }

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| UploadError::new(format!("Erro ao ler o arquivo enviado: {err}")))?
        {
            if bytes.len() + chunk.len() > config.max_file_size {
                return Err(UploadError::new(format!(
                    "Arquivo \"{original_name}\" excede o limite de {} MB",
                    config.max_file_size / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        let mut stored_name = sanitize_filename::sanitize(&original_name);
        if stored_name.is_empty() {
            stored_name = format!("arquivo_{}", form.files.len());
        }

        form.files.push(UploadedFile {
            original_name,
            stored_name,
            content_type,
            bytes,
        });
    }

    Ok(form)
}

fn extensao(nome: &str) -> String {
    Path::new(nome)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Mirrors the accept rule of the upload forms: both the file extension and
/// the declared content type must be in the PDF/JPEG/PNG family.
fn tipo_permitido(nome: &str, content_type: &str) -> bool {
    let ext = extensao(nome);
    if !EXTENSOES_PERMITIDAS.contains(&ext.as_str()) {
        return false;
    }
    ["pdf", "jpg", "jpeg", "png"]
        .iter()
        .any(|token| content_type.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensao_normaliza_para_minusculas() {
        assert_eq!(extensao("Laudo.PDF"), "pdf");
        assert_eq!(extensao("foto.jpeg"), "jpeg");
        assert_eq!(extensao("sem_extensao"), "");
    }

    #[test]
    fn tipos_aceitos_exigem_extensao_e_mime() {
        assert!(tipo_permitido("laudo.pdf", "application/pdf"));
        assert!(tipo_permitido("raio-x.jpg", "image/jpeg"));
        assert!(tipo_permitido("scan.png", "image/png"));

        // Extension right, MIME wrong (and vice versa).
        assert!(!tipo_permitido("laudo.pdf", "application/zip"));
        assert!(!tipo_permitido("planilha.xlsx", "application/pdf"));
        assert!(!tipo_permitido("script.exe", "application/octet-stream"));
    }

    #[test]
    fn field_retorna_o_valor_textual() {
        let mut form = FormUpload::default();
        form.fields.insert("mes".to_string(), "Janeiro".to_string());
        assert_eq!(form.field("mes"), Some("Janeiro"));
        assert_eq!(form.field("ano"), None);
    }
}
