//! User-visible strings. The product ships in Spanish.

pub const DEFAULT_TITLE: &str = "Nueva conversación";
pub const DEFAULT_OPENING: &str = "Inicio de conversación";

pub const OPENING_FAILED: &str = "Error obteniendo mensaje inicial";
pub const LOG_FETCH_FAILED: &str = "Ocurrió un error cargando la conversación";
pub const SEND_FAILED: &str = "Error enviando mensaje";
pub const CREATE_FAILED: &str = "No se pudo crear la conversación";

pub const RECORDING_STARTED: &str = "Grabando… toca el micrófono para detener.";
pub const CAPTURE_UNSUPPORTED: &str = "Tu navegador no soporta grabación de audio.";
pub const PERMISSION_DENIED: &str = "Se necesitan permisos para usar el micrófono";
pub const CAPTURE_START_FAILED: &str = "No se pudo iniciar la grabación.";
pub const STREAM_START_FAILED: &str = "No se pudo iniciar el micrófono en el navegador.";
pub const CAPTURE_STOP_FAILED: &str = "No se pudo procesar la grabación.";

pub const AUDIO_NOT_UNDERSTOOD: &str =
    "No se ha entendido el audio, por favor inténtalo de nuevo.";
pub const AUDIO_FAILED_DETAIL: &str = "No se pudo procesar el audio";
pub const CONNECTION_PROBLEM: &str = "Hubo un problema con tu conexión. Intenta de nuevo.";

/// Prefix the legacy text form puts in front of assistant messages.
pub const ASSISTANT_SIGIL: &str = "Memo:";
