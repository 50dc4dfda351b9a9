//! Prompt contract for the completion service.
//!
//! The natural-language instructions are an external interface: the remote
//! service is told to answer with exact sentinel phrases when it has nothing
//! to report, and downstream classification matches those phrases. The
//! built-in texts below must therefore stay bit-exact unless the caller
//! overrides the instructions entirely.

/// Exact reply meaning "no feedback" at file or whole-PR granularity.
/// Matched case-sensitively after trimming.
pub const NO_FEEDBACK_SENTINEL: &str = "Sin retroalimentación";

/// Reply fragment meaning "no feedback" for one partitioned section.
/// Matched as a substring.
pub const SECTION_NO_ISSUES_SENTINEL: &str = "Sin problemas en esta sección";

/// Instruction configuration consumed by the prompt builders.
///
/// A non-empty `instructions_override` replaces the built-in instructions
/// entirely; `additional_instructions` are appended to the built-in text
/// only and are ignored when an override is present.
#[derive(Debug, Clone, Default)]
pub struct PromptConfig {
    /// Custom instruction text replacing the built-in instructions.
    pub instructions_override: Option<String>,
    /// Extra instruction lines appended to the built-in instructions.
    pub additional_instructions: Vec<String>,
}

impl PromptConfig {
    fn override_text(&self) -> Option<&str> {
        self.instructions_override
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Renders additional instruction lines as a `- ` bullet list.
fn additional_block(lines: &[String]) -> String {
    lines
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Built-in instructions for the per-file review path.
pub fn file_review_instructions(cfg: &PromptConfig) -> String {
    if let Some(custom) = cfg.override_text() {
        return custom.to_string();
    }

    format!(
        r#"Eres un asistente especializado en ingeniería de software, actuando como revisor de código para Pull Requests (PRs).

**Objetivo Principal:**
Tu misión es analizar los cambios de código proporcionados y brindar retroalimentación constructiva para **mejorar la salud general del código**, garantizando calidad, mantenibilidad, rendimiento y seguridad. La retroalimentación debe ser técnica, didáctica, enfocada en el código (no en el autor) y explicar claramente el *razonamiento* detrás de cada punto planteado. Prioriza la identificación de problemas que realmente impacten la calidad y funcionalidad, diferenciando entre problemas críticos y sugerencias menores (nits).

**Formato de Entrada:**
Recibirás los cambios del PR en formato de patch. Cada entrada contiene el mensaje de commit seguido por los cambios de código (diffs) en formato unidiff.

**Instrucciones Detalladas para la Revisión:**
Analiza el código proporcionado basándote en los siguientes criterios. Para cada punto planteado, explica el problema y, siempre que sea posible, sugiere una solución o alternativa clara y accionable.

1.  **Diseño y Arquitectura:**
    * ¿La solución está bien diseñada y se integra adecuadamente al sistema existente?
    * ¿La arquitectura del cambio es sólida y sigue principios como SOLID?
    * ¿Evita complejidad innecesaria o *over-engineering* (funcionalidades no solicitadas)?
    * ¿Considera la mantenibilidad y extensibilidad futuras?

2.  **Funcionalidad y Corrección:**
    * Identifica posibles bugs, errores lógicos o comportamientos inesperados.
    * Verifica si todos los casos límite relevantes fueron considerados y tratados.
    * ¿La funcionalidad implementada corresponde al propósito original de la tarea/issue?

3.  **Legibilidad y Mantenibilidad (Código Limpio):**
    * ¿El código sigue las buenas prácticas de código limpio? ¿Es fácil de leer, entender y modificar?
    * ¿La nomenclatura (variables, funciones, clases, etc.) es clara, significativa, consistente y sigue las convenciones establecidas?
    * ¿Los comentarios son útiles, claros y explican el *por qué* (la intención) en lugar del *qué* (que el código ya dice)? ¿Evita comentarios redundantes o desactualizados?
    * ¿Hay duplicación de código que pueda ser refactorizada hacia un componente reutilizable?

4.  **Rendimiento:**
    * ¿Los cambios pueden introducir cuellos de botella o impactar negativamente el desempeño (latencia, uso de CPU/memoria)?
    * ¿Existen oportunidades claras y significativas para optimización de rendimiento (elección de algoritmos/estructuras de datos, optimización de consultas, reducción de I/O)? Sugiere optimizaciones específicas y justifícalas.

5.  **Seguridad:**
    * Identifica vulnerabilidades conocidas o potenciales introducidas por el cambio (ej. SQL Injection, XSS, manejo inadecuado de datos sensibles).
    * ¿Se están siguiendo las mejores prácticas de seguridad (validación de entrada, sanitización de datos, control de acceso, manejo seguro de errores)?

6.  **Pruebas:**
    * (Si la información sobre pruebas está disponible o puede inferirse del contexto o código) ¿Las pruebas automatizadas (unitarias, integración, etc.) son adecuadas, cubren las nuevas funcionalidades y casos límite?
    * ¿Las pruebas están bien escritas, son legibles y fáciles de mantener?

7.  **Documentación:**
    * (Si es aplicable y la información está disponible) ¿La documentación relevante (READMEs, comentarios de documentación de API/funciones, etc.) fue agregada o actualizada para reflejar los cambios en el código?

**Instrucciones Adicionales Específicas:**
{additional}

**Formato de la Salida:**
* Presenta la retroalimentación de forma clara y estructurada, idealmente agrupada por los criterios anteriores (Diseño, Funcionalidad, etc.).
* Para cada punto, indica el archivo y la línea relevante, si es aplicable.
* Si no se identifica ningún problema o punto de mejora en *ninguno* de los criterios, responde **únicamente** con la frase: {no_feedback}"#,
        additional = additional_block(&cfg.additional_instructions),
        no_feedback = NO_FEEDBACK_SENTINEL,
    )
}

/// Built-in base instructions for the change-request review path, extended
/// with the partitioned-section or whole-PR context suffix.
pub fn change_request_instructions(cfg: &PromptConfig, partitioned: bool) -> String {
    let base = match cfg.override_text() {
        Some(custom) => custom.to_string(),
        None => format!(
            r#"Eres un asistente especializado en ingeniería de software, actuando como revisor de código para Pull Requests (PRs).

**Objetivo Principal:**
Tu misión es analizar los cambios de código proporcionados y brindar retroalimentación constructiva para **mejorar la salud general del código**, garantizando calidad, mantenibilidad, rendimiento y seguridad. La retroalimentación debe ser técnica, didáctica, enfocada en el código (no en el autor) y explicar claramente el *razonamiento* detrás de cada punto planteado.

**Instrucciones Detalladas para la Revisión:**
1. **Diseño y Arquitectura**
2. **Funcionalidad y Corrección**
3. **Legibilidad y Mantenibilidad**
4. **Rendimiento**
5. **Seguridad**
6. **Pruebas**
7. **Documentación**

**Instrucciones Adicionales:**
{additional}

**Formato de la Salida:**
* Presenta la retroalimentación de forma clara y estructurada
* Para cada punto, indica el archivo y la línea relevante, si es aplicable
* Agrupa problemas por tipo: Crítico, Importante, Sugerencias
* Si no se identifica ningún problema significativo, responde: {no_feedback}"#,
            additional = additional_block(&cfg.additional_instructions),
            no_feedback = NO_FEEDBACK_SENTINEL,
        ),
    };

    if partitioned {
        format!(
            r#"{base}

**CONTEXTO IMPORTANTE:** Estás analizando una SECCIÓN de un Pull Request más grande que fue dividido en partes debido a su tamaño. Enfócate en los problemas específicos de esta sección, pero ten en cuenta que es parte de un cambio más amplio. Si no encuentras problemas significativos en esta sección, responde: "{section_sentinel}""#,
            section_sentinel = SECTION_NO_ISSUES_SENTINEL,
        )
    } else {
        format!(
            r#"{base}

**CONTEXTO:** Estás analizando el Pull Request completo en una sola revisión. Considera el impacto general de todos los cambios en conjunto."#
        )
    }
}

/// Prompt for the per-file review path.
pub fn file_prompt(instructions: &str, diff: &str) -> String {
    format!("{instructions}\n, patch : {diff}")
}

/// Prompt for a single-shot whole-PR review.
pub fn whole_pr_prompt(instructions: &str, pr_number: &str, diff_size_kb: f64, diff: &str) -> String {
    format!(
        r#"{instructions}

**INFORMACIÓN DEL PULL REQUEST:**
- PR: #{pr_number}
- Tamaño total: {diff_size_kb:.2} KB
- Análisis: Revisión completa en una sola operación

**CÓDIGO A REVISAR:**
```diff
{diff}
```"#
    )
}

/// Prompt for one partitioned section, embedding its position, count, and
/// size context.
pub fn chunk_prompt(
    instructions: &str,
    pr_number: &str,
    position: usize,
    total: usize,
    chunk_size_kb: f64,
    diff_size_kb: f64,
    chunk: &str,
) -> String {
    format!(
        r#"{instructions}

**INFORMACIÓN DE LA SECCIÓN:**
- Sección: {section} de {total}
- PR: #{pr_number}
- Tamaño de esta sección: {chunk_size_kb:.2} KB
- Tamaño total del PR: {diff_size_kb:.2} KB

**CÓDIGO A REVISAR:**
```diff
{chunk}
```"#,
        section = position + 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_instructions_carry_the_sentinels() {
        let cfg = PromptConfig::default();
        assert!(file_review_instructions(&cfg).contains(NO_FEEDBACK_SENTINEL));
        assert!(change_request_instructions(&cfg, false).contains(NO_FEEDBACK_SENTINEL));
        assert!(change_request_instructions(&cfg, true).contains(SECTION_NO_ISSUES_SENTINEL));
    }

    #[test]
    fn additional_lines_are_trimmed_bulleted_and_appended() {
        let cfg = PromptConfig {
            instructions_override: None,
            additional_instructions: vec![
                "  Revisa el uso de unsafe  ".into(),
                "".into(),
                "Prefiere iteradores".into(),
            ],
        };
        let text = change_request_instructions(&cfg, false);
        assert!(text.contains("- Revisa el uso de unsafe\n- Prefiere iteradores"));
    }

    #[test]
    fn override_replaces_instructions_and_ignores_additional_lines() {
        let cfg = PromptConfig {
            instructions_override: Some("Revisa solo la seguridad.".into()),
            additional_instructions: vec!["esto se ignora".into()],
        };
        let text = change_request_instructions(&cfg, true);
        assert!(text.starts_with("Revisa solo la seguridad."));
        assert!(!text.contains("esto se ignora"));
        // The partition context still applies on top of the override.
        assert!(text.contains(SECTION_NO_ISSUES_SENTINEL));
    }

    #[test]
    fn blank_override_falls_back_to_builtin() {
        let cfg = PromptConfig {
            instructions_override: Some("   ".into()),
            additional_instructions: vec![],
        };
        assert!(file_review_instructions(&cfg).contains("**Objetivo Principal:**"));
    }

    #[test]
    fn chunk_prompt_embeds_position_and_sizes() {
        let p = chunk_prompt("instr", "42", 1, 5, 29.30, 120.00, "diff body");
        assert!(p.contains("Sección: 2 de 5"));
        assert!(p.contains("PR: #42"));
        assert!(p.contains("29.30 KB"));
        assert!(p.contains("120.00 KB"));
    }
}
