//! Browser client of the portal, embedded as a single vanilla-JS bundle.
//!
//! All view state lives in one serializable `state` object and every
//! transition funnels through `render()`, which re-fetches and redraws the
//! current screen from scratch.

pub const APP_SCRIPT: &str = r##"<script>
(function() {
    const API_URL = '/api';
    const MAX_INDIVIDUAL = 10 * 1024 * 1024;
    const MAX_MASSIVO = 50 * 1024 * 1024;

    // Single source of truth for the client. Screens: 'empresas',
    // 'categorias', 'exames', 'admin'.
    const state = {
        token: localStorage.getItem('portal_token'),
        usuario: null,
        tela: 'empresas',
        empresa: null,
        categoria: null,
        exameEmEdicao: null,
        exameVisualizado: null,
        examesParaAbrir: [],
        ultimaListagem: [],
        arquivosMassivos: [],
        categorias: [],
        enviandoExame: false,
        enviandoMassivo: false
    };

    const el = (id) => document.getElementById(id);

    function escapeHtml(valor) {
        return String(valor == null ? '' : valor)
            .replace(/&/g, '&amp;')
            .replace(/</g, '&lt;')
            .replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;')
            .replace(/'/g, '&#39;');
    }

    function showLoading(mensagem) {
        el('loadingText').textContent = mensagem || 'Carregando...';
        el('loadingOverlay').classList.remove('hidden');
    }

    function hideLoading() {
        el('loadingOverlay').classList.add('hidden');
    }

    function showToast(mensagem) {
        const div = document.createElement('div');
        div.className = 'toast';
        div.textContent = mensagem;
        document.body.appendChild(div);
        setTimeout(() => div.remove(), 3000);
    }

    async function api(caminho, opcoes) {
        opcoes = opcoes || {};
        opcoes.headers = Object.assign(
            { 'Authorization': 'Bearer ' + state.token },
            opcoes.headers || {}
        );
        const resposta = await fetch(API_URL + caminho, opcoes);
        if (!resposta.ok) {
            let mensagem = 'Erro no servidor';
            try { mensagem = (await resposta.json()).erro || mensagem; } catch (e) {}
            throw new Error(mensagem);
        }
        return resposta.json();
    }

    // ==================== LOGIN ====================

    el('loginForm').addEventListener('submit', async (e) => {
        e.preventDefault();
        showLoading('Fazendo login...');
        try {
            const resposta = await fetch(API_URL + '/auth/login', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    email: el('loginEmail').value,
                    senha: el('loginSenha').value
                })
            });
            if (!resposta.ok) {
                throw new Error((await resposta.json()).erro);
            }
            const dados = await resposta.json();
            state.token = dados.token;
            state.usuario = dados.usuario;
            localStorage.setItem('portal_token', dados.token);
            localStorage.setItem('portal_usuario', JSON.stringify(dados.usuario));
            el('loginError').classList.add('hidden');
            await entrarApp();
        } catch (err) {
            el('loginError').textContent = err.message;
            el('loginError').classList.remove('hidden');
        } finally {
            hideLoading();
        }
    });

    el('btnLogout').addEventListener('click', () => {
        state.token = null;
        state.usuario = null;
        localStorage.removeItem('portal_token');
        localStorage.removeItem('portal_usuario');
        el('app').classList.add('hidden');
        el('loginScreen').classList.remove('hidden');
        el('loginError').classList.add('hidden');
        el('loginForm').reset();
    });

    async function entrarApp() {
        el('userAvatar').textContent = state.usuario.nome.charAt(0).toUpperCase();
        el('userName').textContent = state.usuario.nome;
        el('userRole').textContent = state.usuario.empresa;

        await carregarCategorias();

        state.empresa = null;
        state.categoria = null;
        state.tela = state.usuario.tipo === 'admin' ? 'empresas' : 'categorias';

        el('loginScreen').classList.add('hidden');
        el('app').classList.remove('hidden');
        render();
    }

    async function carregarCategorias() {
        try {
            state.categorias = await api('/categorias');
        } catch (err) {
            console.error('Erro ao carregar categorias:', err);
        }
    }

    // ==================== NAVEGAÇÃO ====================

    el('btnBack').addEventListener('click', () => {
        if (state.tela === 'exames') {
            state.tela = 'categorias';
            state.categoria = null;
        } else if (state.tela === 'categorias' && state.usuario.tipo === 'admin') {
            state.tela = 'empresas';
            state.empresa = null;
        } else if (state.tela === 'admin') {
            state.tela = state.usuario.tipo === 'admin' ? 'empresas' : 'categorias';
        }
        render();
    });

    el('btnAdmin').addEventListener('click', () => {
        state.tela = 'admin';
        render();
    });

    el('filterMes').addEventListener('change', render);

    function breadcrumb() {
        if (state.tela === 'admin') return 'Administração';
        const partes = [];
        if (state.usuario.tipo === 'admin') partes.push('Empresas');
        else partes.push(state.usuario.empresa);
        if (state.empresa && state.usuario.tipo === 'admin') partes.push(state.empresa.nome);
        if (state.categoria) partes.push(state.categoria.nome);
        return partes.join(' > ');
    }

    function render() {
        ['empresasView', 'categoriasView', 'examesView', 'adminView', 'emptyState']
            .forEach(id => el(id).classList.add('hidden'));

        el('breadcrumb').textContent = breadcrumb();

        const admin = state.usuario.tipo === 'admin';
        const naRaiz = (state.tela === 'empresas' && admin) ||
                       (state.tela === 'categorias' && !admin);
        el('btnBack').classList.toggle('hidden', naRaiz);
        el('btnAdmin').classList.toggle('hidden', !admin);

        const comUpload = state.tela === 'categorias' || state.tela === 'exames';
        el('btnUpload').classList.toggle('hidden', !comUpload);
        el('btnUploadMassivo').classList.toggle('hidden', !comUpload);
        el('btnExportar').classList.toggle('hidden', state.tela !== 'exames');
        el('btnVerTodos').classList.toggle('hidden', state.tela !== 'exames');

        switch (state.tela) {
            case 'empresas': renderEmpresas(); break;
            case 'categorias': renderCategorias(); break;
            case 'exames': renderExames(); break;
            case 'admin': renderAdmin(); break;
        }
    }

    // ==================== EMPRESAS ====================

    let searchTimeout;
    el('searchEmpresas').addEventListener('input', (e) => {
        clearTimeout(searchTimeout);
        const termo = e.target.value.toLowerCase().trim();
        searchTimeout = setTimeout(() => {
            document.querySelectorAll('.empresa-card').forEach(card => {
                const nome = card.dataset.nome.toLowerCase();
                card.style.display = (!termo || nome.includes(termo)) ? 'block' : 'none';
            });
        }, 300);
    });

    async function renderEmpresas() {
        const grid = el('empresasGrid');
        grid.innerHTML = '<p class="empty-state">Carregando...</p>';
        el('empresasView').classList.remove('hidden');

        try {
            const empresas = await api('/empresas');
            if (state.tela !== 'empresas') return;
            grid.innerHTML = '';
            empresas.forEach(empresa => {
                const card = document.createElement('div');
                card.className = 'empresa-card';
                card.dataset.nome = empresa.nome;
                card.innerHTML =
                    '<div class="empresa-header">' + escapeHtml(empresa.nome.charAt(0)) + '</div>' +
                    '<div class="empresa-body">' +
                    '<div class="empresa-name">' + escapeHtml(empresa.nome) + '</div>' +
                    '<div class="empresa-info">' + (empresa.totalExames || 0) + ' exames</div>' +
                    '</div>';
                card.addEventListener('click', () => {
                    state.empresa = empresa;
                    state.tela = 'categorias';
                    render();
                });
                grid.appendChild(card);
            });
        } catch (err) {
            console.error('Erro ao carregar empresas:', err);
            grid.innerHTML = '<p class="empty-state">Erro ao carregar empresas</p>';
        }
    }

    // ==================== CATEGORIAS ====================

    function filtrosAtuais() {
        const params = new URLSearchParams();
        if (state.categoria) params.append('categoria', state.categoria.id);
        if (el('filterMes').value) params.append('mes', el('filterMes').value);
        if (state.empresa) params.append('empresa', state.empresa.id);
        return params;
    }

    async function renderCategorias() {
        const grid = el('categoriasGrid');
        grid.innerHTML = '<p class="empty-state">Carregando...</p>';
        el('categoriasView').classList.remove('hidden');

        try {
            const params = new URLSearchParams();
            if (el('filterMes').value) params.append('mes', el('filterMes').value);
            if (state.empresa) params.append('empresa', state.empresa.id);
            const exames = await api('/exames?' + params);
            if (state.tela !== 'categorias') return;

            grid.innerHTML = '';
            state.categorias.forEach(cat => {
                const total = exames.filter(e => e.categoria.id === cat.id).length;
                const card = document.createElement('div');
                card.className = 'categoria-card';
                card.innerHTML =
                    '<div class="categoria-header" style="background: ' + escapeHtml(cat.cor) + ';">&#128203;</div>' +
                    '<div class="categoria-body">' +
                    '<div class="categoria-name">' + escapeHtml(cat.nome) + '</div>' +
                    '<div class="categoria-count">' + total + ' exames</div>' +
                    '</div>';
                card.addEventListener('click', () => {
                    state.categoria = cat;
                    state.tela = 'exames';
                    render();
                });
                grid.appendChild(card);
            });
        } catch (err) {
            console.error('Erro ao carregar categorias:', err);
            grid.innerHTML = '<p class="empty-state">Erro ao carregar categorias</p>';
        }
    }

    // ==================== EXAMES ====================

    async function renderExames() {
        const lista = el('examesList');
        lista.innerHTML = '<p class="empty-state">Carregando...</p>';
        el('examesView').classList.remove('hidden');

        try {
            const exames = await api('/exames?' + filtrosAtuais());
            if (state.tela !== 'exames') return;
            state.ultimaListagem = exames;
            lista.innerHTML = '';

            if (exames.length === 0) {
                el('emptyState').classList.remove('hidden');
                return;
            }

            exames.forEach(exame => {
                const ehPdf = exame.arquivos[0] && exame.arquivos[0].tipo === 'pdf';
                const item = document.createElement('div');
                item.className = 'exame-item';
                const edicoes = exame.historico.length > 1
                    ? ' | ' + (exame.historico.length - 1) + ' edição(ões)' : '';
                const massivo = exame.tipoUpload === 'massivo' ? ' | Upload Massivo' : '';
                item.innerHTML =
                    '<div class="exame-icon" style="background: ' + (ehPdf ? '#c62828' : '#1976d2') + ';">' +
                    (ehPdf ? 'PDF' : 'IMG') + '</div>' +
                    '<div class="exame-info">' +
                    '<div class="exame-paciente">' + escapeHtml(exame.paciente) + '</div>' +
                    '<div class="exame-tipo">' + escapeHtml(exame.categoria.nome) + '</div>' +
                    '<div class="exame-meta">' +
                    new Date(exame.data).toLocaleDateString('pt-BR') +
                    ' | ' + escapeHtml(exame.empresa.nome) +
                    ' | ' + escapeHtml(exame.enviadoPor.nome) +
                    massivo + edicoes +
                    '</div></div>' +
                    '<div class="exame-actions">' +
                    '<button class="btn-small btn-view">Ver</button>' +
                    '<button class="btn-small btn-edit">Editar</button>' +
                    (state.usuario.tipo === 'admin'
                        ? '<button class="btn-small btn-delete">Excluir</button>' : '') +
                    '</div>';
                item.querySelector('.btn-view').addEventListener('click', () => visualizar(exame));
                item.querySelector('.btn-edit').addEventListener('click', () => abrirModalExame(exame));
                const btnDelete = item.querySelector('.btn-delete');
                if (btnDelete) btnDelete.addEventListener('click', () => excluirExame(exame));
                lista.appendChild(item);
            });
        } catch (err) {
            console.error('Erro ao carregar exames:', err);
            lista.innerHTML = '<p class="empty-state">Erro ao carregar exames</p>';
        }
    }

    async function excluirExame(exame) {
        if (!confirm('Tem certeza que deseja excluir este exame?')) return;
        showLoading('Excluindo...');
        try {
            await api('/exames/' + exame.id, { method: 'DELETE' });
            render();
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    }

    // ==================== MODAL EXAME ====================

    function preencherCategorias(select) {
        select.innerHTML = state.categorias.map(cat =>
            '<option value="' + cat.id + '">' + escapeHtml(cat.nome) + '</option>'
        ).join('');
    }

    el('btnUpload').addEventListener('click', () => abrirModalExame(null));

    function abrirModalExame(exame) {
        state.exameEmEdicao = exame;
        el('modalTitle').textContent = exame ? 'Editar Exame' : 'Enviar Novo Exame';
        preencherCategorias(el('exameCategoria'));

        if (exame) {
            el('examePaciente').value = exame.paciente;
            el('exameCategoria').value = exame.categoria.id;
            el('exameMes').value = exame.mes;
            el('exameAno').value = exame.ano;
            el('exameData').value = exame.data.split('T')[0];
            el('exameObs').value = exame.observacoes || '';
            el('fileName').textContent = exame.arquivos[0]
                ? exame.arquivos[0].nomeOriginal : '';
            el('uploadArea').classList.add('hidden');

            if (exame.historico.length > 0) {
                el('historicoSection').classList.remove('hidden');
                el('historicoList').innerHTML = exame.historico.map(h =>
                    '<div class="historico-item"><span class="historico-user">' +
                    escapeHtml(h.usuario ? h.usuario.nome : 'Usuário') + '</span> ' +
                    escapeHtml(h.acao) + ' em ' +
                    new Date(h.data).toLocaleString('pt-BR') + '</div>'
                ).join('');
            } else {
                el('historicoSection').classList.add('hidden');
            }
        } else {
            el('formExame').reset();
            el('fileName').textContent = '';
            el('examePDF').value = '';
            el('exameAno').value = new Date().getFullYear();
            el('uploadArea').classList.remove('hidden');
            el('historicoSection').classList.add('hidden');
            if (state.categoria) el('exameCategoria').value = state.categoria.id;
        }

        el('modalExame').classList.remove('hidden');
    }

    el('btnCancelar').addEventListener('click', () => {
        el('modalExame').classList.add('hidden');
    });

    el('uploadArea').addEventListener('click', () => el('examePDF').click());

    el('examePDF').addEventListener('change', (e) => {
        const arquivo = e.target.files[0];
        if (!arquivo) return;
        if (arquivo.size > MAX_INDIVIDUAL) {
            alert('Arquivo muito grande! Máximo: 10 MB');
            el('examePDF').value = '';
            return;
        }
        el('fileName').textContent = arquivo.name;
    });

    el('formExame').addEventListener('submit', async (e) => {
        e.preventDefault();
        if (state.enviandoExame) return;
        state.enviandoExame = true;

        showLoading(state.exameEmEdicao ? 'Salvando...' : 'Enviando...');
        try {
            if (state.exameEmEdicao) {
                await api('/exames/' + state.exameEmEdicao.id, {
                    method: 'PUT',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        paciente: el('examePaciente').value,
                        categoria: el('exameCategoria').value,
                        mes: el('exameMes').value,
                        ano: parseInt(el('exameAno').value, 10),
                        data: el('exameData').value,
                        observacoes: el('exameObs').value
                    })
                });
            } else {
                const form = new FormData();
                form.append('paciente', el('examePaciente').value);
                form.append('categoria', el('exameCategoria').value);
                form.append('mes', el('exameMes').value);
                form.append('ano', el('exameAno').value);
                form.append('data', el('exameData').value);
                form.append('observacoes', el('exameObs').value);
                if (el('examePDF').files[0]) {
                    form.append('pdf', el('examePDF').files[0]);
                }
                if (state.usuario.tipo === 'admin' && state.empresa) {
                    form.append('empresa', state.empresa.id);
                }
                await api('/exames', { method: 'POST', body: form });
            }
            el('modalExame').classList.add('hidden');
            render();
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
            state.enviandoExame = false;
        }
    });

    // ==================== UPLOAD MASSIVO ====================

    const MESES = ['Janeiro', 'Fevereiro', 'Março', 'Abril', 'Maio', 'Junho',
        'Julho', 'Agosto', 'Setembro', 'Outubro', 'Novembro', 'Dezembro'];

    el('btnUploadMassivo').addEventListener('click', () => {
        preencherCategorias(el('massCategoria'));
        if (state.categoria) el('massCategoria').value = state.categoria.id;
        el('massMes').value = MESES[new Date().getMonth()];
        el('massAno').value = new Date().getFullYear();
        renderArquivosMassivos();
        el('modalMassivo').classList.remove('hidden');
    });

    el('uploadAreaMassivo').addEventListener('click', () => el('massPDFs').click());

    el('massPDFs').addEventListener('change', (e) => {
        Array.from(e.target.files).forEach(arquivo => {
            if (arquivo.size > MAX_MASSIVO) {
                alert('Arquivo "' + arquivo.name + '" muito grande! Máximo: 50 MB');
                return;
            }
            state.arquivosMassivos.push(arquivo);
        });
        e.target.value = '';
        renderArquivosMassivos();
    });

    function renderArquivosMassivos() {
        const lista = el('arquivosSelecionados');
        el('countArquivos').textContent = state.arquivosMassivos.length;
        el('btnEnviarMassivo').disabled = state.arquivosMassivos.length === 0;

        if (state.arquivosMassivos.length === 0) {
            lista.innerHTML = '<p class="empty-state" style="padding: 20px;">Nenhum arquivo selecionado</p>';
            return;
        }

        let total = 0;
        lista.innerHTML = state.arquivosMassivos.map((arquivo, i) => {
            total += arquivo.size;
            const extensao = arquivo.name.split('.').pop().toLowerCase();
            const ehImagem = ['jpg', 'jpeg', 'png'].includes(extensao);
            return '<div class="exame-item">' +
                '<div class="exame-icon" style="background: ' + (ehImagem ? '#1976d2' : '#c62828') + ';">' +
                (ehImagem ? 'IMG' : 'PDF') + '</div>' +
                '<div class="exame-info">' +
                '<div class="exame-paciente">' + escapeHtml(arquivo.name) + '</div>' +
                '<div class="exame-tipo">' + (arquivo.size / 1024 / 1024).toFixed(2) + ' MB</div>' +
                '</div>' +
                '<button class="btn-small btn-delete" data-index="' + i + '">Remover</button>' +
                '</div>';
        }).join('') +
            '<p class="file-name">Total: ' + state.arquivosMassivos.length + ' arquivo(s), ' +
            (total / 1024 / 1024).toFixed(2) + ' MB</p>';

        lista.querySelectorAll('[data-index]').forEach(btn => {
            btn.addEventListener('click', () => {
                state.arquivosMassivos.splice(parseInt(btn.dataset.index, 10), 1);
                renderArquivosMassivos();
            });
        });
    }

    el('btnCancelarMassivo').addEventListener('click', () => {
        el('modalMassivo').classList.add('hidden');
    });

    el('btnEnviarMassivo').addEventListener('click', async () => {
        if (state.arquivosMassivos.length === 0) return;
        if (state.enviandoMassivo) return;
        state.enviandoMassivo = true;

        const form = new FormData();
        form.append('categoria', el('massCategoria').value);
        form.append('mes', el('massMes').value);
        form.append('ano', el('massAno').value);
        form.append('lote', el('massLote').value);
        if (state.usuario.tipo === 'admin' && state.empresa) {
            form.append('empresa', state.empresa.id);
        }
        state.arquivosMassivos.forEach(arquivo => form.append('arquivos', arquivo));

        showLoading('Enviando ' + state.arquivosMassivos.length + ' arquivo(s)...');
        try {
            const resposta = await api('/exames/massivo', { method: 'POST', body: form });
            el('modalMassivo').classList.add('hidden');
            state.arquivosMassivos = [];
            if (resposta.ignorados > 0) {
                alert(resposta.mensagem + ' — ' + resposta.ignorados + ' arquivo(s) inválido(s) ignorado(s)');
            } else {
                showToast(resposta.mensagem);
            }
            render();
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
            state.enviandoMassivo = false;
        }
    });

    // ==================== VISUALIZADOR ====================

    function urlDoArquivo(exame, arquivo) {
        return API_URL + '/exames/' + exame.id + '/arquivo/' + arquivo.id +
            '?token=' + encodeURIComponent(state.token);
    }

    function visualizar(exame) {
        if (!exame.arquivos.length) return;
        state.exameVisualizado = exame;
        el('pdfTitulo').textContent = exame.paciente;
        el('pdfFrame').src = urlDoArquivo(exame, exame.arquivos[0]);
        el('modalPDF').classList.remove('hidden');
    }

    el('btnFecharPDF').addEventListener('click', () => {
        el('modalPDF').classList.add('hidden');
        el('pdfFrame').src = '';
    });

    el('btnBaixarPDF').addEventListener('click', () => {
        const exame = state.exameVisualizado;
        if (exame && exame.arquivos.length) {
            window.open(urlDoArquivo(exame, exame.arquivos[0]), '_blank');
        }
    });

    // ==================== VER TODOS ====================

    el('btnVerTodos').addEventListener('click', () => {
        if (state.ultimaListagem.length === 0) {
            alert('Nenhum exame para abrir');
            return;
        }
        state.examesParaAbrir = state.ultimaListagem;
        el('totalExamesAbrir').textContent = state.examesParaAbrir.length;
        el('modalVerTodos').classList.remove('hidden');
    });

    el('btnCancelarTodos').addEventListener('click', () => {
        el('modalVerTodos').classList.add('hidden');
    });

    el('btnConfirmarTodos').addEventListener('click', () => {
        el('modalVerTodos').classList.add('hidden');
        const exames = state.examesParaAbrir;
        showLoading('Abrindo ' + exames.length + ' abas...');

        let i = 0;
        const intervalo = setInterval(() => {
            if (i >= exames.length) {
                clearInterval(intervalo);
                hideLoading();
                showToast(exames.length + ' abas abertas');
                return;
            }
            const exame = exames[i];
            if (exame.arquivos.length) {
                window.open(urlDoArquivo(exame, exame.arquivos[0]), '_blank');
            }
            i++;
        }, 500);
    });

    // ==================== EXPORTAÇÃO ====================

    el('btnExportar').addEventListener('click', () => {
        const exames = state.ultimaListagem;
        if (exames.length === 0) {
            alert('Nenhum exame para exportar');
            return;
        }
        let csv = 'Paciente;Categoria;Mês;Ano;Data;Empresa;Enviado Por;Tipo Upload\n';
        exames.forEach(e => {
            csv += [e.paciente, e.categoria.nome, e.mes, e.ano,
                new Date(e.data).toLocaleDateString('pt-BR'),
                e.empresa.nome, e.enviadoPor.nome, e.tipoUpload].join(';') + '\n';
        });
        const blob = new Blob([csv], { type: 'text/csv;charset=utf-8;' });
        const link = document.createElement('a');
        link.href = URL.createObjectURL(blob);
        link.download = 'exames_' + (state.categoria ? state.categoria.nome : 'todos') + '.csv';
        link.click();
    });

    // ==================== ADMIN ====================

    async function renderAdmin() {
        el('adminView').classList.remove('hidden');

        el('categoriasList').innerHTML = state.categorias.map(cat =>
            '<div class="categoria-list-item">' +
            '<div class="categoria-list-name">' + escapeHtml(cat.nome) + '</div>' +
            '<button class="btn-small btn-delete" data-id="' + cat.id + '">Remover</button>' +
            '</div>'
        ).join('');
        el('categoriasList').querySelectorAll('button').forEach(btn => {
            btn.addEventListener('click', () => removerCategoria(btn.dataset.id));
        });

        await carregarEmpresasSelect();
        await carregarUsuarios();
    }

    async function carregarEmpresasSelect() {
        try {
            const empresas = await api('/empresas');
            el('novoUsuarioEmpresa').innerHTML = empresas.map(e =>
                '<option value="' + e.id + '">' + escapeHtml(e.nome) + '</option>'
            ).join('');
        } catch (err) {
            console.error('Erro ao carregar empresas:', err);
        }
    }

    async function carregarUsuarios() {
        try {
            const usuarios = await api('/admin/usuarios');
            const lista = el('listaUsuarios');
            if (usuarios.length === 0) {
                lista.innerHTML = '<p class="empty-state" style="padding: 20px;">Nenhum usuário cadastrado</p>';
                return;
            }
            lista.innerHTML = usuarios.map(u =>
                '<div class="categoria-list-item">' +
                '<div><div style="color: #fff;">' + escapeHtml(u.nome) + '</div>' +
                '<div style="color: #888; font-size: 12px;">' + escapeHtml(u.email) + ' • ' +
                (u.tipo === 'admin' ? 'Admin' : escapeHtml(u.empresa ? u.empresa.nome : 'Sem empresa')) +
                '</div></div>' +
                '<div style="display: flex; gap: 8px;">' +
                '<button class="btn-small" data-senha="' + u.id + '" data-nome="' + escapeHtml(u.nome) + '">Senha</button>' +
                '<button class="btn-small btn-delete" data-excluir="' + u.id + '" data-nome="' + escapeHtml(u.nome) + '">Excluir</button>' +
                '</div></div>'
            ).join('');

            lista.querySelectorAll('[data-senha]').forEach(btn => {
                btn.addEventListener('click', () => abrirTrocarSenha(btn.dataset.senha, btn.dataset.nome));
            });
            lista.querySelectorAll('[data-excluir]').forEach(btn => {
                btn.addEventListener('click', () => excluirUsuario(btn.dataset.excluir, btn.dataset.nome));
            });
        } catch (err) {
            console.error('Erro ao carregar usuários:', err);
        }
    }

    el('btnAddCategoria').addEventListener('click', async () => {
        const nome = el('novaCategoriaInput').value.trim();
        if (!nome) return;
        showLoading('Criando categoria...');
        try {
            await api('/categorias', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ nome: nome })
            });
            el('novaCategoriaInput').value = '';
            await carregarCategorias();
            renderAdmin();
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    });

    async function removerCategoria(id) {
        if (!confirm('Deseja remover esta categoria?')) return;
        showLoading('Removendo...');
        try {
            await api('/categorias/' + id, { method: 'DELETE' });
            await carregarCategorias();
            renderAdmin();
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    }

    el('formNovaEmpresa').addEventListener('submit', async (e) => {
        e.preventDefault();
        showLoading('Criando empresa...');
        try {
            await api('/admin/criar-empresa', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    nome: el('novaEmpresaNome').value,
                    cnpj: el('novaEmpresaCNPJ').value,
                    telefone: el('novaEmpresaTelefone').value,
                    email: el('novaEmpresaEmail').value,
                    endereco: el('novaEmpresaEndereco').value
                })
            });
            el('formNovaEmpresa').reset();
            await carregarEmpresasSelect();
            showToast('Empresa criada com sucesso');
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    });

    el('novoUsuarioTipo').addEventListener('change', (e) => {
        el('selectEmpresaUsuario').style.display =
            e.target.value === 'admin' ? 'none' : 'block';
    });

    el('formNovoUsuario').addEventListener('submit', async (e) => {
        e.preventDefault();
        const tipo = el('novoUsuarioTipo').value;
        showLoading('Criando usuário...');
        try {
            await api('/admin/criar-usuario', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    nome: el('novoUsuarioNome').value,
                    email: el('novoUsuarioEmail').value,
                    senha: el('novoUsuarioSenha').value,
                    tipo: tipo,
                    empresaId: tipo === 'empresa' ? el('novoUsuarioEmpresa').value : null
                })
            });
            el('formNovoUsuario').reset();
            await carregarUsuarios();
            showToast('Usuário criado com sucesso');
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    });

    function abrirTrocarSenha(usuarioId, usuarioNome) {
        el('usuarioIdSenha').value = usuarioId;
        el('usuarioNomeSenha').value = usuarioNome;
        el('novaSenha').value = '';
        el('confirmarSenha').value = '';
        el('modalTrocarSenha').classList.remove('hidden');
    }

    el('btnCancelarSenha').addEventListener('click', () => {
        el('modalTrocarSenha').classList.add('hidden');
    });

    el('formTrocarSenha').addEventListener('submit', async (e) => {
        e.preventDefault();
        const novaSenha = el('novaSenha').value;
        if (novaSenha !== el('confirmarSenha').value) {
            alert('As senhas não coincidem!');
            return;
        }
        if (novaSenha.length < 3) {
            alert('Senha deve ter no mínimo 3 caracteres!');
            return;
        }
        showLoading('Alterando senha...');
        try {
            await api('/admin/trocar-senha', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    usuarioId: el('usuarioIdSenha').value,
                    novaSenha: novaSenha
                })
            });
            el('modalTrocarSenha').classList.add('hidden');
            showToast('Senha alterada com sucesso');
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    });

    async function excluirUsuario(usuarioId, usuarioNome) {
        if (!confirm('Tem certeza que deseja excluir o usuário "' + usuarioNome + '"?')) return;
        showLoading('Excluindo usuário...');
        try {
            await api('/admin/usuarios/' + usuarioId, { method: 'DELETE' });
            await carregarUsuarios();
            showToast('Usuário excluído com sucesso');
        } catch (err) {
            alert('Erro: ' + err.message);
        } finally {
            hideLoading();
        }
    }

    // ==================== AUTO-LOGIN ====================

    window.addEventListener('DOMContentLoaded', async () => {
        if (!state.token) return;
        try {
            const resposta = await fetch(API_URL + '/categorias', {
                headers: { 'Authorization': 'Bearer ' + state.token }
            });
            if (resposta.ok) {
                const salvo = JSON.parse(localStorage.getItem('portal_usuario') || '{}');
                if (salvo.nome) {
                    state.usuario = salvo;
                    await entrarApp();
                    return;
                }
            }
        } catch (err) {
            console.error('Erro ao verificar token:', err);
        }
        localStorage.removeItem('portal_token');
        localStorage.removeItem('portal_usuario');
        state.token = null;
    });
})();
</script>"##;
