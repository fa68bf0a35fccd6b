//! HTML pages: the public endpoint overview and the placeholder task page
//! shown to logged in users.

use axum::{response::Html, routing::get, Router};
use time::{macros::format_description, OffsetDateTime};
use tracing::{debug, instrument};

use crate::{auth::extractors::AuthSession, state::AppState};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/tareas", get(tasks))
}

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>API Sistema de Gestión de Tareas</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        .header { background: #f4f4f4; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .endpoint { background: #e8f4f8; padding: 15px; margin: 10px 0; border-radius: 5px; }
        .method { background: #007bff; color: white; padding: 5px 10px; border-radius: 3px; font-size: 12px; }
        .example { background: #f8f9fa; padding: 10px; border-left: 4px solid #28a745; margin: 10px 0; }
    </style>
</head>
<body>
    <div class="header">
        <h1>API Sistema de Gestión de Tareas</h1>
        <p>API REST para gestión de usuarios y tareas</p>
    </div>

    <h2>Endpoints Disponibles</h2>

    <div class="endpoint">
        <h3><span class="method">POST</span> /registro</h3>
        <p><strong>Descripción:</strong> Registra un nuevo usuario en el sistema</p>
        <div class="example"><pre>{
    "usuario": "nombre_usuario",
    "contraseña": "contraseña_segura"
}</pre></div>
    </div>

    <div class="endpoint">
        <h3><span class="method">POST</span> /login</h3>
        <p><strong>Descripción:</strong> Inicia sesión con credenciales de usuario</p>
        <div class="example"><pre>{
    "usuario": "nombre_usuario",
    "contraseña": "contraseña_segura"
}</pre></div>
    </div>

    <div class="endpoint">
        <h3><span class="method">GET</span> /tareas</h3>
        <p><strong>Descripción:</strong> Muestra página de bienvenida para usuarios autenticados</p>
        <p><strong>Nota:</strong> Requiere haber iniciado sesión previamente</p>
    </div>

    <div class="endpoint">
        <h3><span class="method">POST</span> /logout</h3>
        <p><strong>Descripción:</strong> Cierra la sesión del usuario actual</p>
    </div>

    <h2>Cómo probar la API</h2>
    <div class="example">
        <h4>Ejemplo con curl:</h4>
        <pre># Registrar usuario
curl -X POST http://localhost:5000/registro \
  -H "Content-Type: application/json" \
  -d '{"usuario": "testuser", "contraseña": "password123"}'

# Iniciar sesión
curl -X POST http://localhost:5000/login \
  -H "Content-Type: application/json" \
  -d '{"usuario": "testuser", "contraseña": "password123"}' \
  -c cookies.txt

# Acceder a tareas (usando cookies de sesión)
curl -X GET http://localhost:5000/tareas \
  -b cookies.txt</pre>
    </div>
</body>
</html>
"#;

#[instrument]
pub async fn home() -> Html<&'static str> {
    Html(HOME_HTML)
}

#[instrument(skip_all)]
pub async fn tasks(AuthSession(session): AuthSession) -> Html<String> {
    debug!(user_id = session.user_id, "rendering task page");
    let accessed_at = OffsetDateTime::now_utc()
        .format(format_description!(
            "[day]/[month]/[year] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| "Ahora".into());
    Html(render_tasks_page(&session.username, session.user_id, &accessed_at))
}

fn render_tasks_page(username: &str, user_id: i64, accessed_at: &str) -> String {
    let username = escape_html(username);
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bienvenido - Sistema de Tareas</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px;
               background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; color: white; }}
        .container {{ background: rgba(255, 255, 255, 0.1); padding: 30px; border-radius: 15px; }}
        .header {{ text-align: center; margin-bottom: 30px; }}
        .welcome-card {{ background: rgba(255, 255, 255, 0.2); padding: 20px; border-radius: 10px; margin: 20px 0; }}
        .stats {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }}
        .stat-card {{ background: rgba(255, 255, 255, 0.15); padding: 15px; border-radius: 8px; text-align: center; }}
        .btn {{ background: #4CAF50; color: white; padding: 10px 20px; border: none; border-radius: 5px;
                cursor: pointer; text-decoration: none; display: inline-block; margin: 5px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>¡Bienvenido al Sistema de Gestión de Tareas!</h1>
            <p>Hola <strong>{username}</strong>, has iniciado sesión correctamente</p>
        </div>

        <div class="welcome-card">
            <h2>Información de tu cuenta</h2>
            <p><strong>Usuario:</strong> {username}</p>
            <p><strong>ID de usuario:</strong> {user_id}</p>
            <p><strong>Estado:</strong> Sesión activa</p>
            <p><strong>Fecha de acceso:</strong> {accessed_at}</p>
        </div>

        <div class="stats">
            <div class="stat-card"><h3>Tareas Pendientes</h3><p>0</p></div>
            <div class="stat-card"><h3>Tareas Completadas</h3><p>0</p></div>
            <div class="stat-card"><h3>Proyectos Activos</h3><p>0</p></div>
        </div>

        <div style="text-align: center; margin-top: 30px;">
            <a href="/" class="btn">Inicio</a>
            <button onclick="logout()" class="btn" style="background: #f44336;">Cerrar Sesión</button>
        </div>
    </div>

    <script>
        function logout() {{
            fetch('/logout', {{ method: 'POST', headers: {{ 'Content-Type': 'application/json' }} }})
                .then(response => response.json())
                .then(data => {{
                    alert(data.mensaje || 'Sesión cerrada');
                    window.location.href = '/';
                }})
                .catch(() => alert('Error al cerrar sesión'));
        }}
    </script>
</body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
