//! Magic-number validation for uploaded exam files.
//!
//! Uploads declare a MIME type, but the declared type is only trusted when
//! the leading bytes carry the matching signature. Anything else is
//! rejected before it reaches the blob store.

use serde::{Deserialize, Serialize};

/// Known signatures, checked against the start of the buffer.
const SIGNATURES: &[(&str, &[u8])] = &[
    ("application/pdf", b"%PDF"),
    ("image/jpeg", &[0xFF, 0xD8, 0xFF]),
    ("image/png", &[0x89, 0x50, 0x4E, 0x47]),
];

/// Returns true iff the buffer starts with the signature registered for the
/// declared MIME type. A buffer matching a *different* known signature, or
/// none at all, is rejected outright.
pub fn conteudo_corresponde(bytes: &[u8], mime_declarado: &str) -> bool {
    for (tipo, magic) in SIGNATURES {
        if bytes.len() >= magic.len() && &bytes[..magic.len()] == *magic {
            return *tipo == mime_declarado;
        }
    }
    false
}

/// Coarse classification recorded on each stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoArquivo {
    Pdf,
    Imagem,
}

impl TipoArquivo {
    pub fn do_mime(mime_declarado: &str) -> Self {
        if mime_declarado.contains("pdf") {
            TipoArquivo::Pdf
        } else {
            TipoArquivo::Imagem
        }
    }

    pub fn do_registro(valor: &str) -> Self {
        match valor {
            "pdf" => TipoArquivo::Pdf,
            _ => TipoArquivo::Imagem,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TipoArquivo::Pdf => "pdf",
            TipoArquivo::Imagem => "imagem",
        }
    }

    /// Content type used when the file is streamed back to the browser.
    pub fn content_type(self) -> mime::Mime {
        match self {
            TipoArquivo::Pdf => mime::APPLICATION_PDF,
            TipoArquivo::Imagem => mime::IMAGE_JPEG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &[u8] = b"%PDF-1.7 restante do arquivo";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn aceita_assinaturas_corretas() {
        assert!(conteudo_corresponde(PDF, "application/pdf"));
        assert!(conteudo_corresponde(JPEG, "image/jpeg"));
        assert!(conteudo_corresponde(PNG, "image/png"));
    }

    #[test]
    fn rejeita_tipo_declarado_divergente() {
        // Bytes are a valid PNG, but the upload claims to be a PDF.
        assert!(!conteudo_corresponde(PNG, "application/pdf"));
        assert!(!conteudo_corresponde(PDF, "image/png"));
        assert!(!conteudo_corresponde(JPEG, "image/png"));
    }

    #[test]
    fn rejeita_conteudo_sem_assinatura_conhecida() {
        assert!(!conteudo_corresponde(b"GIF89a...", "image/png"));
        assert!(!conteudo_corresponde(b"texto qualquer", "application/pdf"));
        assert!(!conteudo_corresponde(&[], "application/pdf"));
    }

    #[test]
    fn rejeita_prefixo_truncado() {
        assert!(!conteudo_corresponde(b"%PD", "application/pdf"));
        assert!(!conteudo_corresponde(&[0xFF, 0xD8], "image/jpeg"));
    }

    #[test]
    fn classificacao_por_mime() {
        assert_eq!(TipoArquivo::do_mime("application/pdf"), TipoArquivo::Pdf);
        assert_eq!(TipoArquivo::do_mime("image/jpeg"), TipoArquivo::Imagem);
        assert_eq!(TipoArquivo::do_mime("image/png"), TipoArquivo::Imagem);
    }

    #[test]
    fn content_type_de_download() {
        assert_eq!(TipoArquivo::Pdf.content_type(), mime::APPLICATION_PDF);
        assert_eq!(TipoArquivo::Imagem.content_type(), mime::IMAGE_JPEG);
    }
}
