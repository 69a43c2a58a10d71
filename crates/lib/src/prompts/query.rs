//! # Query Generation Prompt
//!
//! The system instruction sent with every database-related turn. The table
//! layout and the metric proxy rules are rendered into the template, so a new
//! schema or a real effectiveness column needs configuration, not new prompt
//! text.

use crate::types::{MetricProxy, TableSpec};

/// The system instruction for SQL generation.
///
/// Placeholders: `{table}`, `{columns}`, `{proxy_rules}`, `{second_example}`
pub const QUERY_SYSTEM_PROMPT: &str = r#"Você é um especialista em PostgreSQL e em otimização de consultas. Dada uma pergunta sobre dados de inseminação, gere uma consulta SQL precisa para a tabela '{table}'.

# Esquema
A tabela '{table}' tem as colunas: {columns}.

# Objetivo
Gere uma consulta correta que responda completamente à pergunta. Não faça suposições; se a pergunta for ambígua, use o histórico da conversa para esclarecê-la. Se a pergunta não puder ser respondida com os dados disponíveis, responda com uma mensagem amigável explicando isso, sem SQL.
Para condições múltiplas ou relações complexas entre colunas, organize a lógica com subconsultas ou CTEs (cláusula WITH).

# Regras
1. Agregação: se a pergunta pedir "maior", "menor", "média", "total" ou "número de", use funções de agregação (`AVG()`, `COUNT()`, `MAX()`, `MIN()`, `SUM()`) com `GROUP BY` nas colunas relevantes (por exemplo, `GROUP BY fazenda`).
2. Limite: se a pergunta pedir uma quantidade específica de resultados (por exemplo, "3 fazendas"), use `LIMIT`.
3. Ordenação: se a pergunta envolver "maior", "menor", "melhor" ou similar, use `ORDER BY`, com `DESC` para maior primeiro e `ASC` para menor primeiro.
{proxy_rules}
# Saída
Responda APENAS com o código SQL, sem comentários, explicações ou formatação.
Se a pergunta for "quais fazendas temos", liste apenas os nomes distintos das fazendas, sem outros detalhes.
Mantenha a consulta breve e eficiente. Evite junções desnecessárias e use LIMIT para evitar resultados grandes.
Corrija erros de sintaxe ou de agregação antes de responder.

# Exemplo 1: Forneça 3 fazendas que têm maior número de animais
SELECT fazenda, COUNT(numero_animal) AS total_animais
FROM {table}
GROUP BY fazenda
ORDER BY total_animais DESC
LIMIT 3;

{second_example}"#;

/// Renders one numbered rule per metric proxy, starting after the fixed rules.
///
/// Returns an empty string when there are no proxies.
pub fn render_proxy_rules(proxies: &[MetricProxy]) -> String {
    proxies
        .iter()
        .enumerate()
        .map(|(i, proxy)| {
            let detail = proxy
                .description
                .as_deref()
                .map(|d| format!(": {d}"))
                .unwrap_or_default();
            format!(
                "{n}. Métrica substituta: se a pergunta for sobre \"{metric}\" e não houver dados diretos sobre isso, use a frequência de `{column}`{detail}. Use `COUNT({column})` e `GROUP BY {column}` para encontrar os valores mais frequentes.\n",
                n = i + 4,
                metric = proxy.metric,
                column = proxy.column,
            )
        })
        .collect()
}

/// Renders the second worked example: the first metric proxy, or a
/// single-winner aggregation when no proxy is configured.
pub fn render_second_example(table: &TableSpec, proxies: &[MetricProxy]) -> String {
    let Some(proxy) = proxies.first() else {
        return format!(
            "# Exemplo 2: Qual fazenda tem mais animais?\n\
             SELECT fazenda, COUNT(numero_animal) AS total_animais\n\
             FROM {table}\n\
             GROUP BY fazenda\n\
             ORDER BY total_animais DESC\n\
             LIMIT 1;",
            table = table.name,
        );
    };
    format!(
        "# Exemplo 2: Qual é o {column} com maior {metric}?\n\
         SELECT {column}, COUNT({column}) AS {column}_count\n\
         FROM {table}\n\
         GROUP BY {column}\n\
         ORDER BY {column}_count DESC\n\
         LIMIT 1;",
        column = proxy.column,
        metric = proxy.metric,
        table = table.name,
    )
}

/// Builds the SQL generation system instruction for `table`.
pub fn build_query_system_prompt(table: &TableSpec, proxies: &[MetricProxy]) -> String {
    QUERY_SYSTEM_PROMPT
        .replace("{table}", &table.name)
        .replace("{columns}", &table.columns.join(", "))
        .replace("{proxy_rules}", &render_proxy_rules(proxies))
        .replace("{second_example}", &render_second_example(table, proxies))
}
