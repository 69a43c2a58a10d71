//! # Shared Constants
//!
//! Defaults for the insemination records table and the fixed user-facing
//! messages returned by the assistant.

/// The default SQLite database file used by the server.
pub const DEFAULT_DB_FILE: &str = "db/farmassist.db";

/// The table holding the insemination records.
pub const DEFAULT_TABLE_NAME: &str = "inseminacoes";

/// Every column of [`DEFAULT_TABLE_NAME`], in schema order.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "fazenda",
    "estado",
    "municipio",
    "numero_animal",
    "lote",
    "raça",
    "categoria",
    "ecc",
    "ciclicidade",
    "protocolo",
    "implante_p4",
    "empresa",
    "gnrh_na_ia",
    "pgf_no_d0",
    "dose_pgf_retirada",
    "marca_pgf_retirada",
    "dose_ce",
    "ecg",
    "dose_ecg",
    "touro",
    "raça_touro",
    "empresa_touro",
    "inseminador",
    "num_iatf",
    "dg",
    "vazia_com_ou_sem_cl",
    "perda",
];

/// The column rendered alone when present in a result row.
pub const DEFAULT_FOCUS_COLUMN: &str = "fazenda";

/// Placeholder for null values in result rows.
pub const NULL_PLACEHOLDER: &str = "N/A";

// --- User-facing messages ---

pub const MSG_TRANSPORT_RETRY: &str = "Desculpe, estou tendo dificuldades para elaborar a consulta SQL. Por favor, tente reformular sua pergunta ou tente novamente mais tarde.";
pub const MSG_NO_RESULTS: &str = "Não encontrei nenhum resultado correspondente no banco de dados.";
pub const MSG_NOT_SQL: &str = "A resposta do modelo não é uma consulta SQL válida.";
pub const MSG_SQL_ERROR_PREFIX: &str = "Erro na consulta SQL";
pub const MSG_DB_ERROR_PREFIX: &str = "Erro ao consultar o banco de dados. Detalhes";
pub const MSG_UNEXPECTED_PREFIX: &str = "Erro inesperado";
pub const MSG_COMPLETION_ERROR_PREFIX: &str = "Erro ao obter resposta do modelo";
