// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class and create the top-level window.
//   • Host a multi-line EDIT control as the editing surface.
//   • Build the File / Edit / Help menu bar and the Ctrl+O / Ctrl+S
//     accelerators.
//   • Run the Win32 message loop and translate messages into `App` intents.
//   • Expose a safe error-dialog helper for use by main().
//
// Window state lives in a thread-local: the message loop, the WndProc and the
// state are all confined to the UI thread.  Modal dialogs re-enter the
// WndProc while an intent is running, so `App` is only ever reached through
// `try_borrow_mut`.

#![allow(unsafe_code)]

use std::{
    cell::{Cell, RefCell},
    ffi::c_void,
    rc::Rc,
};

use tracing::{debug, warn};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, BOOL, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            CreateFontW, DeleteObject, GetStockObject, CLEARTYPE_QUALITY, CLIP_DEFAULT_PRECIS,
            DEFAULT_CHARSET, FF_MODERN, FIXED_PITCH, FW_NORMAL, HBRUSH, HFONT, HGDIOBJ,
            OUT_DEFAULT_PRECIS, WHITE_BRUSH,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::SetFocus,
            WindowsAndMessaging::{
                AppendMenuW, CreateAcceleratorTableW, CreateMenu, CreateWindowExW,
                DefWindowProcW, DestroyAcceleratorTable, DestroyWindow, DispatchMessageW,
                GetClientRect, GetMessageW, GetWindowRect,
                LoadCursorW, LoadIconW, MoveWindow, PostQuitMessage, RegisterClassExW,
                SendMessageW, SetMenu, ShowWindow, TranslateAcceleratorW, TranslateMessage,
                UpdateWindow, ACCEL, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, FCONTROL, FVIRTKEY,
                HACCEL, HMENU, IDC_ARROW, IDI_APPLICATION, MF_POPUP, MF_SEPARATOR, MF_STRING,
                MSG, SW_SHOW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_COPY,
                WM_CUT, WM_DESTROY, WM_PASTE, WM_SETFOCUS, WM_SETFONT, WM_SIZE, WNDCLASSEXW,
                WS_CHILD, WS_EX_CLIENTEDGE, WS_HSCROLL, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
                WS_VSCROLL,
            },
        },
    },
};

use super::{dialogs, dpi, shell::Win32Shell, wide};
use crate::{
    app::{about_text, App},
    document::APP_NAME,
    error::{NotepadError, Result},
    settings::Settings,
    shell::FsDisk,
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("SimpleNotepadMainWindow");

// ── Control and command IDs ───────────────────────────────────────────────────

const IDC_EDITOR: u16 = 100;

const IDM_FILE_OPEN: u16 = 1001;
const IDM_FILE_SAVE: u16 = 1002;
const IDM_FILE_SAVE_AS: u16 = 1003;
const IDM_FILE_EXIT: u16 = 1004;
const IDM_EDIT_CUT: u16 = 2001;
const IDM_EDIT_COPY: u16 = 2002;
const IDM_EDIT_PASTE: u16 = 2003;
const IDM_HELP_ABOUT: u16 = 9001;

// ── Edit-control constants (winuser.h) ────────────────────────────────────────

const ES_MULTILINE: u32 = 0x0004;
const ES_AUTOVSCROLL: u32 = 0x0040;
const ES_AUTOHSCROLL: u32 = 0x0080;
const ES_NOHIDESEL: u32 = 0x0100;
const EM_SETLIMITTEXT: u32 = 0x00C5;
const EN_CHANGE: u32 = 0x0300;

// ── Window state ──────────────────────────────────────────────────────────────

struct WindowState {
    edit: HWND,
    font: HFONT,
    /// Shared with `Win32Shell`; see `Win32Shell::show_text`.
    muted: Rc<Cell<bool>>,
    app: RefCell<App<Win32Shell, FsDisk>>,
    settings: RefCell<Settings>,
}

thread_local! {
    static WINDOW: RefCell<Option<Rc<WindowState>>> = const { RefCell::new(None) };
}

/// Clone out the current window state, if the window is fully built.
fn window_state() -> Option<Rc<WindowState>> {
    WINDOW.with(|w| w.borrow().clone())
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Build the main window, then drive the message loop until the user exits.
pub(crate) fn run(settings: Settings) -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::init();

    // SAFETY: a null module name returns the .exe's own HMODULE, which is
    // valid for the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(PCWSTR::null()) }?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;
    let hwnd = create_main_window(hinstance, &settings)?;
    let edit = create_editor(hinstance, hwnd)?;
    let font = create_font(hwnd, edit, &settings);

    let muted = Rc::new(Cell::new(false));
    let mut app = App::new(Win32Shell::new(hwnd, edit, Rc::clone(&muted)), FsDisk);
    app.start();

    WINDOW.with(|w| {
        *w.borrow_mut() = Some(Rc::new(WindowState {
            edit,
            font,
            muted,
            app: RefCell::new(app),
            settings: RefCell::new(settings),
        }))
    });
    layout(hwnd, edit);

    // SAFETY: hwnd and edit were just created and are valid.  Return values
    // (previous visibility, paint success, previous focus) are not needed.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
        let _ = SetFocus(edit);
    }

    #[cfg(debug_assertions)]
    debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "window visible"
    );

    let accel = create_accelerators()?;
    let result = message_loop(hwnd, accel);
    // SAFETY: accel came from CreateAcceleratorTableW and is destroyed once.
    let _ = unsafe { DestroyAcceleratorTable(accel) };
    result
}

/// Show a modal error dialog with the given message.  No owner window.
pub(crate) fn show_fatal_error(message: &str) {
    dialogs::show_error(HWND::default(), message, "Simple Notepad - Fatal Error");
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: IDI_APPLICATION / IDC_ARROW are built-in resources that exist on
    // every Windows version; a null instance selects the system resources.
    let icon = unsafe { LoadIconW(HINSTANCE::default(), IDI_APPLICATION) }?;
    let cursor = unsafe { LoadCursorW(HINSTANCE::default(), IDC_ARROW) }?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ;
    // stock brushes are usable as HBRUSH.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }
    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_main_window(hinstance: HINSTANCE, settings: &Settings) -> Result<HWND> {
    let system_dpi = dpi::system();
    let title = wide(APP_NAME);

    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module;
    // `title` outlives the call.  Null parent → top-level window.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            dpi::scale(settings.window_width, system_dpi),
            dpi::scale(settings.window_height, system_dpi),
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )
    }?;

    let menu = build_menu()?;
    // SAFETY: hwnd and menu are valid handles; the window takes ownership of
    // the menu and destroys it with itself.
    unsafe { SetMenu(hwnd, menu) }?;

    Ok(hwnd)
}

fn create_editor(hinstance: HINSTANCE, parent: HWND) -> Result<HWND> {
    let style = WS_CHILD
        | WS_VISIBLE
        | WS_VSCROLL
        | WS_HSCROLL
        | WINDOW_STYLE(ES_MULTILINE | ES_AUTOVSCROLL | ES_AUTOHSCROLL | ES_NOHIDESEL);

    // SAFETY: "EDIT" is a system-registered class; parent is our live main
    // window.  For a child window the HMENU slot carries the control ID.
    let edit = unsafe {
        CreateWindowExW(
            WS_EX_CLIENTEDGE,
            w!("EDIT"),
            PCWSTR::null(),
            style,
            0,
            0,
            0,
            0,
            parent,
            HMENU(IDC_EDITOR as usize as *mut c_void),
            hinstance,
            None,
        )
    }?;

    // Lift the 32 KiB default text limit to the control's maximum.
    // SAFETY: edit is valid; EM_SETLIMITTEXT takes no pointers.
    unsafe { SendMessageW(edit, EM_SETLIMITTEXT, WPARAM(0), LPARAM(0)) };

    Ok(edit)
}

/// Create the editor font and hand it to the edit control.
///
/// Returns a null handle when creation fails; the control then keeps its
/// default font.
fn create_font(hwnd: HWND, edit: HWND, settings: &Settings) -> HFONT {
    let height = dpi::scale(settings.font_size, dpi::for_window(hwnd));
    let face = wide(&settings.font_face);

    // SAFETY: `face` is a null-terminated UTF-16 string that outlives the call.
    let font = unsafe {
        CreateFontW(
            -height,
            0,
            0,
            0,
            FW_NORMAL.0 as i32,
            0,
            0,
            0,
            DEFAULT_CHARSET,
            OUT_DEFAULT_PRECIS,
            CLIP_DEFAULT_PRECIS,
            CLEARTYPE_QUALITY,
            FIXED_PITCH.0 as u32 | FF_MODERN.0 as u32,
            PCWSTR(face.as_ptr()),
        )
    };
    if font.is_invalid() {
        warn!(face = %settings.font_face, "could not create editor font");
        return font;
    }
    // SAFETY: edit is valid and the font outlives it (deleted on WM_DESTROY).
    // LPARAM(1) asks the control to redraw.
    unsafe { SendMessageW(edit, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1)) };
    font
}

/// Resize the edit control to fill the client area.
fn layout(hwnd: HWND, edit: HWND) {
    let mut rc = RECT::default();
    // SAFETY: hwnd and edit are valid; `rc` is a valid out-pointer.
    unsafe {
        if GetClientRect(hwnd, &mut rc).is_ok() {
            let _ = MoveWindow(
                edit,
                0,
                0,
                rc.right - rc.left,
                rc.bottom - rc.top,
                BOOL::from(true),
            );
        }
    }
}

// ── Menu construction ─────────────────────────────────────────────────────────

fn build_menu() -> Result<HMENU> {
    // SAFETY: CreateMenu / AppendMenuW have no preconditions beyond valid
    // handles, which every call below passes; failures propagate through `?`.
    unsafe {
        let bar = CreateMenu()?;

        // ── File ──────────────────────────────────────────────────────────────
        let file = CreateMenu()?;
        AppendMenuW(file, MF_STRING, IDM_FILE_OPEN as usize, w!("&Open...\tCtrl+O"))?;
        AppendMenuW(file, MF_STRING, IDM_FILE_SAVE as usize, w!("&Save\tCtrl+S"))?;
        AppendMenuW(file, MF_STRING, IDM_FILE_SAVE_AS as usize, w!("Save &As..."))?;
        AppendMenuW(file, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(file, MF_STRING, IDM_FILE_EXIT as usize, w!("E&xit"))?;

        // ── Edit ──────────────────────────────────────────────────────────────
        let edit = CreateMenu()?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_CUT as usize, w!("Cu&t\tCtrl+X"))?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_COPY as usize, w!("&Copy\tCtrl+C"))?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_PASTE as usize, w!("&Paste\tCtrl+V"))?;

        // ── Help ──────────────────────────────────────────────────────────────
        let help = CreateMenu()?;
        AppendMenuW(help, MF_STRING, IDM_HELP_ABOUT as usize, w!("&About"))?;

        // The uIDNewItem parameter for MF_POPUP is the child HMENU cast to usize.
        AppendMenuW(bar, MF_POPUP, file.0 as usize, w!("&File"))?;
        AppendMenuW(bar, MF_POPUP, edit.0 as usize, w!("&Edit"))?;
        AppendMenuW(bar, MF_POPUP, help.0 as usize, w!("&Help"))?;

        Ok(bar)
    }
}

/// Ctrl+O and Ctrl+S.  Cut/Copy/Paste shortcuts are handled by the edit
/// control itself.
fn create_accelerators() -> Result<HACCEL> {
    let table = [
        ACCEL {
            fVirt: FVIRTKEY | FCONTROL,
            key: u16::from(b'O'),
            cmd: IDM_FILE_OPEN,
        },
        ACCEL {
            fVirt: FVIRTKEY | FCONTROL,
            key: u16::from(b'S'),
            cmd: IDM_FILE_SAVE,
        },
    ];
    // SAFETY: `table` is a valid slice of initialised ACCEL entries; the
    // function copies it.
    Ok(unsafe { CreateAcceleratorTableW(&table) }?)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(hwnd: HWND, accel: HACCEL) -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; a null HWND retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            // WM_QUIT: normal exit, process status 0.
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // After WM_DESTROY hwnd is stale and TranslateAcceleratorW
                // simply returns 0.
                if TranslateAcceleratorW(hwnd, accel, &msg) == 0 {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // ── Lifecycle ─────────────────────────────────────────────────────────
        WM_CLOSE => {
            request_close(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            if let Some(state) = WINDOW.with(|w| w.borrow_mut().take()) {
                if !state.font.is_invalid() {
                    // SAFETY: the edit control dies with its parent, so the
                    // font is no longer selected anywhere.
                    let _ = DeleteObject(HGDIOBJ(state.font.0));
                }
            }
            // SAFETY: posts WM_QUIT with exit code 0 to this thread's queue.
            PostQuitMessage(0);
            LRESULT(0)
        }

        // ── Layout and focus ──────────────────────────────────────────────────
        WM_SIZE => {
            if let Some(state) = window_state() {
                // lparam low word = new client width, high word = new height.
                let width = (lparam.0 & 0xFFFF) as i32;
                let height = ((lparam.0 >> 16) & 0xFFFF) as i32;
                let _ = MoveWindow(state.edit, 0, 0, width, height, BOOL::from(true));
            }
            LRESULT(0)
        }

        WM_SETFOCUS => {
            if let Some(state) = window_state() {
                let _ = SetFocus(state.edit);
            }
            LRESULT(0)
        }

        // ── Commands ──────────────────────────────────────────────────────────
        WM_COMMAND => {
            if on_command(hwnd, wparam, lparam) {
                LRESULT(0)
            } else {
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
        }

        // SAFETY: hwnd and message parameters are valid — provided by Windows.
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Dispatch a `WM_COMMAND`.  Returns `false` for commands we do not own.
fn on_command(hwnd: HWND, wparam: WPARAM, lparam: LPARAM) -> bool {
    let id = (wparam.0 & 0xFFFF) as u16;
    let code = ((wparam.0 >> 16) & 0xFFFF) as u32;

    let Some(state) = window_state() else {
        return false;
    };

    // Control notifications carry the control's HWND in lparam.
    if lparam.0 != 0 {
        if id == IDC_EDITOR && code == EN_CHANGE && !state.muted.get() {
            match state.app.try_borrow_mut() {
                Ok(mut app) => app.surface_changed(),
                Err(_) => debug!("edit notification while busy"),
            }
        }
        return true;
    }

    match id {
        IDM_FILE_OPEN => with_app(&state, |app| app.open()),
        IDM_FILE_SAVE => with_app(&state, |app| {
            app.save();
        }),
        IDM_FILE_SAVE_AS => with_app(&state, |app| {
            app.save_as();
        }),
        IDM_FILE_EXIT => request_close(hwnd),
        IDM_EDIT_CUT => forward_to_editor(&state, WM_CUT),
        IDM_EDIT_COPY => forward_to_editor(&state, WM_COPY),
        IDM_EDIT_PASTE => forward_to_editor(&state, WM_PASTE),
        IDM_HELP_ABOUT => dialogs::show_info(hwnd, &about_text(), "About"),
        _ => return false,
    }
    true
}

/// Run one intent unless another is already in progress.
fn with_app(state: &WindowState, intent: impl FnOnce(&mut App<Win32Shell, FsDisk>)) {
    match state.app.try_borrow_mut() {
        Ok(mut app) => intent(&mut app),
        Err(_) => debug!("command ignored while a dialog is open"),
    }
}

/// Window close button or File → Exit.
fn request_close(hwnd: HWND) {
    let may_close = match window_state() {
        Some(state) => {
            let may_close = state
                .app
                .try_borrow_mut()
                .map(|mut app| app.exit())
                .unwrap_or(false);
            if may_close {
                remember_window_size(hwnd, &state);
            }
            may_close
        }
        None => true,
    };
    if may_close {
        // SAFETY: hwnd is our main window.  No borrow of the window state is
        // held here, so WM_DESTROY is free to tear it down.
        let _ = unsafe { DestroyWindow(hwnd) };
    }
}

/// Persist the current outer size for the next start.
fn remember_window_size(hwnd: HWND, state: &WindowState) {
    let mut rc = RECT::default();
    // SAFETY: hwnd is valid; `rc` is a valid out-pointer.
    if unsafe { GetWindowRect(hwnd, &mut rc) }.is_err() {
        return;
    }
    let window_dpi = dpi::for_window(hwnd);
    let mut settings = state.settings.borrow_mut();
    settings.window_width = dpi::unscale(rc.right - rc.left, window_dpi);
    settings.window_height = dpi::unscale(rc.bottom - rc.top, window_dpi);
    if let Err(e) = settings.save() {
        warn!(error = %e, "could not save settings");
    }
}

fn forward_to_editor(state: &WindowState, msg: u32) {
    // SAFETY: edit is a live child control; WM_CUT/WM_COPY/WM_PASTE take no
    // parameters.
    unsafe { SendMessageW(state.edit, msg, WPARAM(0), LPARAM(0)) };
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `NotepadError`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> NotepadError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    NotepadError::Win32 {
        function,
        code: code.0,
    }
}
