//! Canned replies for the plain-HTTP fallback endpoint.
//!
//! Used when a client cannot hold a websocket or the inference service is not
//! reachable. Groups are checked in order; the first match wins.

use crate::keywords::contains_any;

const PROGRAMMING: &[&str] = &["python", "código", "code", "programación"];
const ASSISTANT: &[&str] = &["chatbot", "bot", "ayuda", "help"];
const REPOSITORY: &[&str] = &["github", "repo", "repositorio"];
const INFERENCE: &[&str] = &["ollama", "modelo", "ia", "ai"];
const DEPLOYMENT: &[&str] = &["vercel", "deploy", "nube", "cloud"];

const PROGRAMMING_REPLY: &str = "¡Excelente pregunta sobre programación! 🐍\n\n\
Puedo ayudarte con:\n\
• Conceptos de programación\n\
• Mejores prácticas\n\
• Patrones de diseño\n\
• Debugging\n\n\
¿En qué lenguaje específico te gustaría que te ayude?";

const ASSISTANT_REPLY: &str = "🤖 **Smart Chatbot**\n\n\
Soy tu asistente de programación. En este modo sin conexión en tiempo real puedo orientarte sobre:\n\n\
✅ **Conceptos de programación**\n\
✅ **Mejores prácticas**\n\
✅ **Análisis de código**\n\
✅ **Solución de problemas**\n\n\
Para respuestas generadas por el modelo, usa el chat en tiempo real.";

const REPOSITORY_REPLY: &str = "🔗 **Integración con GitHub**\n\n\
Para conectar tu repositorio necesitas:\n\n\
1. **Token de GitHub** con permisos `repo`\n\
2. **GITHUB_TOKEN** configurado en el archivo .env\n\
3. **URL de tu repositorio**, por ejemplo https://github.com/usuario/proyecto\n\n\
Después, conéctalo desde el panel del chat.";

const INFERENCE_REPLY: &str = "🧠 **Ollama**\n\n\
Las respuestas del chat en tiempo real las genera un modelo local servido por Ollama.\n\n\
✅ Instala Ollama y ejecuta `ollama serve`\n\
✅ Descarga un modelo, por ejemplo `ollama pull phi3`\n\
✅ Ajusta OLLAMA_BASE_URL si no usas el puerto por defecto\n\n\
Ejecuta `smartchat check` para verificar la conexión.";

const DEPLOYMENT_REPLY: &str = "☁️ **Despliegue**\n\n\
El servidor es un único binario. Configura HOST y PORT (o usa `--host` y `--port`) \
y asegúrate de que el servicio de Ollama sea accesible desde la máquina.\n\n\
El chat en tiempo real necesita soporte de WebSockets en el proxy.";

/// Reply to `message` without calling any upstream service.
pub fn canned_reply(message: &str) -> String {
    let groups: [(&[&str], &str); 5] = [
        (PROGRAMMING, PROGRAMMING_REPLY),
        (ASSISTANT, ASSISTANT_REPLY),
        (REPOSITORY, REPOSITORY_REPLY),
        (INFERENCE, INFERENCE_REPLY),
        (DEPLOYMENT, DEPLOYMENT_REPLY),
    ];

    groups
        .iter()
        .find(|(keywords, _)| contains_any(message, keywords))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| default_reply(message))
}

fn default_reply(message: &str) -> String {
    format!(
        "¡Hola! 👋\n\nRecibí tu mensaje: '{message}'\n\n\
         Soy tu asistente de programación. Puedo ayudarte con:\n\n\
         • 📚 **Conceptos de programación**\n\
         • 🔧 **Mejores prácticas**\n\
         • 🐛 **Debugging**\n\
         • 📖 **Recursos de aprendizaje**\n\n\
         ¿En qué puedo ayudarte específicamente?"
    )
}
