use axum::response::Html;

use crate::web::app_ui::APP_SCRIPT;

/// Stylesheet of the single-page client.
const APP_STYLES: &str = r##"
:root { color-scheme: dark; }
* { box-sizing: border-box; }
body { font-family: "Segoe UI", Roboto, Arial, sans-serif; margin: 0; background: #121212; color: #e0e0e0; }
.hidden { display: none !important; }
button { font-family: inherit; cursor: pointer; }
input, select, textarea { font-family: inherit; width: 100%; padding: 10px 12px; background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 8px; color: #fff; font-size: 14px; }
input:focus, select:focus, textarea:focus { outline: none; border-color: #1976d2; }
label { display: block; margin: 12px 0 6px; font-size: 13px; color: #aaa; }

.login-screen { min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 24px; }
.login-card { background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 12px; padding: 36px 32px; width: 100%; max-width: 380px; }
.login-card h1 { margin: 0 0 4px; font-size: 22px; color: #fff; }
.login-card p { margin: 0 0 20px; color: #888; font-size: 14px; }
.login-error { color: #f44336; font-size: 13px; margin-top: 12px; min-height: 18px; }

.btn-primary { width: 100%; margin-top: 20px; padding: 12px; border: none; border-radius: 8px; background: #1976d2; color: #fff; font-size: 15px; font-weight: 600; }
.btn-primary:hover { background: #1565c0; }
.btn-primary:disabled { opacity: 0.6; cursor: not-allowed; }

header.app-header { display: flex; align-items: center; gap: 16px; padding: 14px 24px; background: #1b1b1b; border-bottom: 1px solid #2a2a2a; flex-wrap: wrap; }
.breadcrumb { flex: 1; color: #aaa; font-size: 14px; min-width: 120px; }
.btn-header { padding: 8px 14px; background: #252525; color: #e0e0e0; border: 1px solid #333; border-radius: 8px; font-size: 13px; }
.btn-header:hover { background: #2f2f2f; }
.user-box { display: flex; align-items: center; gap: 10px; }
.user-avatar { width: 36px; height: 36px; border-radius: 50%; background: #1976d2; color: #fff; display: flex; align-items: center; justify-content: center; font-weight: 700; }
.user-name { font-size: 14px; color: #fff; }
.user-role { font-size: 12px; color: #888; }

main.app-main { padding: 24px; max-width: 1100px; margin: 0 auto; }
.cards-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 16px; }
.empresa-card, .categoria-card { background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 12px; overflow: hidden; cursor: pointer; transition: transform 0.12s ease, border-color 0.12s ease; }
.empresa-card:hover, .categoria-card:hover { transform: translateY(-2px); border-color: #1976d2; }
.empresa-header, .categoria-header { height: 72px; display: flex; align-items: center; justify-content: center; background: #1976d2; color: #fff; font-size: 28px; font-weight: 700; }
.empresa-body, .categoria-body { padding: 14px; }
.empresa-name, .categoria-name { font-size: 15px; color: #fff; font-weight: 600; }
.empresa-info, .categoria-count { font-size: 13px; color: #888; margin-top: 4px; }

.exame-item { display: flex; align-items: center; gap: 14px; background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 10px; padding: 14px; margin-bottom: 10px; }
.exame-icon { width: 44px; height: 44px; border-radius: 10px; display: flex; align-items: center; justify-content: center; color: #fff; font-size: 12px; font-weight: 700; flex-shrink: 0; }
.exame-info { flex: 1; min-width: 0; }
.exame-paciente { color: #fff; font-weight: 600; font-size: 14px; }
.exame-tipo { color: #1976d2; font-size: 13px; margin-top: 2px; }
.exame-meta { color: #888; font-size: 12px; margin-top: 4px; }
.exame-actions { display: flex; gap: 8px; flex-wrap: wrap; }
.btn-small { padding: 6px 10px; border: 1px solid #333; border-radius: 6px; background: #252525; color: #e0e0e0; font-size: 12px; }
.btn-small:hover { background: #2f2f2f; }
.btn-delete { border-color: #5c1f1f; color: #f44336; }
.btn-delete:hover { background: #3a1515; }

.panel { background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
.panel h2 { margin: 0 0 14px; font-size: 16px; color: #fff; }
.categoria-list-item { display: flex; align-items: center; justify-content: space-between; gap: 12px; padding: 10px 12px; border-bottom: 1px solid #2a2a2a; }
.categoria-list-item:last-child { border-bottom: none; }
.categoria-list-name { color: #e0e0e0; font-size: 14px; }
.inline-form { display: flex; gap: 10px; }
.inline-form input { flex: 1; }
.inline-form button { padding: 10px 16px; border: none; border-radius: 8px; background: #1976d2; color: #fff; }

.empty-state { text-align: center; color: #666; padding: 60px 20px; }

.modal { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.7); display: flex; align-items: center; justify-content: center; z-index: 100; padding: 20px; }
.modal-card { background: #1b1b1b; border: 1px solid #2a2a2a; border-radius: 12px; padding: 24px; width: 100%; max-width: 520px; max-height: 90vh; overflow-y: auto; }
.modal-card h2 { margin: 0 0 16px; font-size: 17px; color: #fff; }
.modal-card.wide { max-width: 860px; }
.modal-actions { display: flex; gap: 10px; margin-top: 20px; }
.modal-actions button { flex: 1; padding: 11px; border-radius: 8px; border: none; font-size: 14px; }
.btn-confirm { background: #1976d2; color: #fff; }
.btn-confirm:disabled { opacity: 0.6; cursor: not-allowed; }
.btn-cancel { background: #252525; color: #e0e0e0; border: 1px solid #333 !important; }

.upload-area { border: 2px dashed #333; border-radius: 10px; padding: 28px; text-align: center; color: #888; cursor: pointer; margin-top: 12px; }
.upload-area:hover { border-color: #1976d2; color: #1976d2; }
.file-name { color: #1976d2; font-size: 13px; margin-top: 8px; min-height: 16px; }

.historico-section { margin-top: 16px; border-top: 1px solid #2a2a2a; padding-top: 12px; }
.historico-item { font-size: 12px; color: #888; padding: 4px 0; }
.historico-user { color: #1976d2; font-weight: 600; }

.pdf-frame { width: 100%; height: 70vh; border: none; border-radius: 8px; background: #252525; }

.loading-overlay { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.8); display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 16px; z-index: 9999; }
.spinner { width: 48px; height: 48px; border: 4px solid #1976d2; border-top-color: transparent; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.loading-text { color: #fff; font-size: 15px; }

.toast { position: fixed; top: 20px; right: 20px; background: #2e7d32; color: #fff; padding: 14px 22px; border-radius: 8px; font-size: 14px; z-index: 10000; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.4); }

@media (max-width: 720px) {
    header.app-header { padding: 12px 14px; }
    main.app-main { padding: 16px 14px; }
    .exame-item { flex-direction: column; align-items: flex-start; }
}
"##;

/// Month labels reused by the filter and both upload forms.
const OPCOES_DE_MES: &str = r#"<option value="Janeiro">Janeiro</option>
<option value="Fevereiro">Fevereiro</option>
<option value="Março">Março</option>
<option value="Abril">Abril</option>
<option value="Maio">Maio</option>
<option value="Junho">Junho</option>
<option value="Julho">Julho</option>
<option value="Agosto">Agosto</option>
<option value="Setembro">Setembro</option>
<option value="Outubro">Outubro</option>
<option value="Novembro">Novembro</option>
<option value="Dezembro">Dezembro</option>"#;

pub async fn index() -> Html<String> {
    Html(render_index())
}

fn render_index() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <title>Portal de Exames</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{styles}
    </style>
</head>
<body>
    <div id="loadingOverlay" class="loading-overlay hidden">
        <div class="spinner"></div>
        <p id="loadingText" class="loading-text">Carregando...</p>
    </div>

    <div id="loginScreen" class="login-screen">
        <div class="login-card">
            <h1>Portal de Exames</h1>
            <p>Acesse com sua conta para consultar os exames.</p>
            <form id="loginForm">
                <label for="loginEmail">Email</label>
                <input type="email" id="loginEmail" autocomplete="username" required>
                <label for="loginSenha">Senha</label>
                <input type="password" id="loginSenha" autocomplete="current-password" required>
                <button type="submit" class="btn-primary">Entrar</button>
            </form>
            <p id="loginError" class="login-error hidden"></p>
        </div>
    </div>

    <div id="app" class="hidden">
        <header class="app-header">
            <button id="btnBack" class="btn-header hidden">&larr; Voltar</button>
            <span id="breadcrumb" class="breadcrumb"></span>
            <select id="filterMes" style="width: auto;">
                <option value="">Todos os meses</option>
{meses}
            </select>
            <button id="btnVerTodos" class="btn-header hidden">Ver Todos</button>
            <button id="btnExportar" class="btn-header hidden">Exportar</button>
            <button id="btnUpload" class="btn-header hidden">Enviar Exame</button>
            <button id="btnUploadMassivo" class="btn-header hidden">Upload Massivo</button>
            <button id="btnAdmin" class="btn-header hidden">Administração</button>
            <div class="user-box">
                <div id="userAvatar" class="user-avatar"></div>
                <div>
                    <div id="userName" class="user-name"></div>
                    <div id="userRole" class="user-role"></div>
                </div>
            </div>
            <button id="btnLogout" class="btn-header">Sair</button>
        </header>

        <main class="app-main">
            <div id="empresasView" class="hidden">
                <div style="margin-bottom: 16px;">
                    <input type="text" id="searchEmpresas" placeholder="Buscar empresa..." style="max-width: 400px;">
                </div>
                <div id="empresasGrid" class="cards-grid"></div>
            </div>

            <div id="categoriasView" class="hidden">
                <div id="categoriasGrid" class="cards-grid"></div>
            </div>

            <div id="examesView" class="hidden">
                <div id="examesList"></div>
                <div id="emptyState" class="empty-state hidden">Nenhum exame encontrado.</div>
            </div>

            <div id="adminView" class="hidden">
                <div class="panel">
                    <h2>Categorias</h2>
                    <div class="inline-form">
                        <input type="text" id="novaCategoriaInput" placeholder="Nova categoria...">
                        <button id="btnAddCategoria" type="button">Adicionar</button>
                    </div>
                    <div id="categoriasList" style="margin-top: 12px;"></div>
                </div>

                <div class="panel">
                    <h2>Nova Empresa</h2>
                    <form id="formNovaEmpresa">
                        <label for="novaEmpresaNome">Nome</label>
                        <input type="text" id="novaEmpresaNome" required>
                        <label for="novaEmpresaCNPJ">CNPJ</label>
                        <input type="text" id="novaEmpresaCNPJ">
                        <label for="novaEmpresaTelefone">Telefone</label>
                        <input type="text" id="novaEmpresaTelefone">
                        <label for="novaEmpresaEmail">Email</label>
                        <input type="email" id="novaEmpresaEmail">
                        <label for="novaEmpresaEndereco">Endereço</label>
                        <input type="text" id="novaEmpresaEndereco">
                        <button type="submit" class="btn-primary">Criar Empresa</button>
                    </form>
                </div>

                <div class="panel">
                    <h2>Novo Usuário</h2>
                    <form id="formNovoUsuario">
                        <label for="novoUsuarioNome">Nome</label>
                        <input type="text" id="novoUsuarioNome" required>
                        <label for="novoUsuarioEmail">Email</label>
                        <input type="email" id="novoUsuarioEmail" required>
                        <label for="novoUsuarioSenha">Senha</label>
                        <input type="password" id="novoUsuarioSenha" required>
                        <label for="novoUsuarioTipo">Tipo</label>
                        <select id="novoUsuarioTipo">
                            <option value="empresa">Empresa</option>
                            <option value="admin">Administrador</option>
                        </select>
                        <div id="selectEmpresaUsuario">
                            <label for="novoUsuarioEmpresa">Empresa</label>
                            <select id="novoUsuarioEmpresa"></select>
                        </div>
                        <button type="submit" class="btn-primary">Criar Usuário</button>
                    </form>
                </div>

                <div class="panel">
                    <h2>Usuários</h2>
                    <div id="listaUsuarios"></div>
                </div>
            </div>
        </main>
    </div>

    <div id="modalExame" class="modal hidden">
        <div class="modal-card">
            <h2 id="modalTitle">Enviar Novo Exame</h2>
            <form id="formExame">
                <label for="examePaciente">Paciente</label>
                <input type="text" id="examePaciente">
                <label for="exameCategoria">Categoria</label>
                <select id="exameCategoria"></select>
                <label for="exameMes">Mês</label>
                <select id="exameMes">
{meses}
                </select>
                <label for="exameAno">Ano</label>
                <input type="number" id="exameAno" min="2000" max="2100" required>
                <label for="exameData">Data do exame</label>
                <input type="date" id="exameData" required>
                <label for="exameObs">Observações</label>
                <textarea id="exameObs" rows="3"></textarea>
                <div id="uploadArea" class="upload-area">Clique para selecionar o arquivo (PDF, JPEG ou PNG — máx. 10 MB)</div>
                <input type="file" id="examePDF" accept=".pdf,.jpg,.jpeg,.png" class="hidden">
                <p id="fileName" class="file-name"></p>
                <div id="historicoSection" class="historico-section hidden">
                    <h2 style="font-size: 14px;">Histórico</h2>
                    <div id="historicoList"></div>
                </div>
                <div class="modal-actions">
                    <button type="button" id="btnCancelar" class="btn-cancel">Cancelar</button>
                    <button type="submit" class="btn-confirm">Salvar</button>
                </div>
            </form>
        </div>
    </div>

    <div id="modalMassivo" class="modal hidden">
        <div class="modal-card wide">
            <h2>Upload Massivo</h2>
            <label for="massCategoria">Categoria</label>
            <select id="massCategoria"></select>
            <label for="massMes">Mês</label>
            <select id="massMes">
{meses}
            </select>
            <label for="massAno">Ano</label>
            <input type="number" id="massAno" min="2000" max="2100">
            <label for="massLote">Identificação do lote (opcional)</label>
            <input type="text" id="massLote" placeholder="Ex.: Remessa de Abril">
            <div id="uploadAreaMassivo" class="upload-area">Clique para adicionar arquivos (até 100, máx. 50 MB cada)</div>
            <input type="file" id="massPDFs" accept=".pdf,.jpg,.jpeg,.png" multiple class="hidden">
            <p class="file-name"><span id="countArquivos">0</span> arquivo(s) selecionado(s)</p>
            <div id="arquivosSelecionados"></div>
            <div class="modal-actions">
                <button type="button" id="btnCancelarMassivo" class="btn-cancel">Cancelar</button>
                <button type="button" id="btnEnviarMassivo" class="btn-confirm" disabled>Enviar</button>
            </div>
        </div>
    </div>

    <div id="modalTrocarSenha" class="modal hidden">
        <div class="modal-card">
            <h2>Trocar Senha</h2>
            <form id="formTrocarSenha">
                <input type="hidden" id="usuarioIdSenha">
                <label>Usuário</label>
                <input type="text" id="usuarioNomeSenha" disabled>
                <label for="novaSenha">Nova senha</label>
                <input type="password" id="novaSenha" required>
                <label for="confirmarSenha">Confirmar senha</label>
                <input type="password" id="confirmarSenha" required>
                <div class="modal-actions">
                    <button type="button" id="btnCancelarSenha" class="btn-cancel">Cancelar</button>
                    <button type="submit" class="btn-confirm">Alterar</button>
                </div>
            </form>
        </div>
    </div>

    <div id="modalPDF" class="modal hidden">
        <div class="modal-card wide">
            <h2 id="pdfTitulo">Visualizar Exame</h2>
            <iframe id="pdfFrame" class="pdf-frame"></iframe>
            <div class="modal-actions">
                <button type="button" id="btnFecharPDF" class="btn-cancel">Fechar</button>
                <button type="button" id="btnBaixarPDF" class="btn-confirm">Abrir em nova aba</button>
            </div>
        </div>
    </div>

    <div id="modalVerTodos" class="modal hidden">
        <div class="modal-card">
            <h2>Abrir todos os exames</h2>
            <p style="color: #aaa; font-size: 14px;">Serão abertas <span id="totalExamesAbrir">0</span> abas, uma por exame. Continuar?</p>
            <div class="modal-actions">
                <button type="button" id="btnCancelarTodos" class="btn-cancel">Cancelar</button>
                <button type="button" id="btnConfirmarTodos" class="btn-confirm">Abrir</button>
            </div>
        </div>
    </div>

{script}
</body>
</html>"##,
        styles = APP_STYLES,
        meses = OPCOES_DE_MES,
        script = APP_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagina_contem_os_blocos_principais() {
        let html = render_index();
        for id in [
            "loginForm",
            "empresasGrid",
            "categoriasGrid",
            "examesList",
            "adminView",
            "modalExame",
            "modalMassivo",
            "modalTrocarSenha",
            "modalPDF",
            "modalVerTodos",
            "loadingOverlay",
        ] {
            assert!(html.contains(id), "faltou o elemento #{id}");
        }
    }
}
