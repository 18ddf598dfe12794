//! Authority backed by the system `libmunge`.
//!
//! Every call goes to the local `munged` over its domain socket; the
//! daemon signs and verifies, tracks replays, and checks clocks. This
//! module only marshals contexts and buffers across the C boundary.
//!
//! Requires linking against `libmunge` (`-lmunge`).

use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::{self, NonNull};

use libc::{c_char, c_int, c_void, gid_t, uid_t};
use zeroize::{Zeroize, Zeroizing};

use munge_cred_core::{AuthorityStatus, Identity, TtlRequest};

use crate::error::{AuthorityError, Result};
use crate::traits::{Authority, AuthorityContext, StatusResult};

#[allow(non_camel_case_types)]
mod ffi {
    use libc::{c_char, c_int, c_void, gid_t, uid_t};

    #[repr(C)]
    pub struct munge_ctx {
        _private: [u8; 0],
    }

    pub type munge_ctx_t = *mut munge_ctx;

    pub const EMUNGE_SUCCESS: c_int = 0;

    pub const MUNGE_OPT_TTL: c_int = 4;
    pub const MUNGE_OPT_SOCKET: c_int = 8;
    pub const MUNGE_OPT_UID_RESTRICTION: c_int = 9;
    pub const MUNGE_OPT_GID_RESTRICTION: c_int = 10;

    pub const MUNGE_TTL_MAXIMUM: c_int = -1;

    #[link(name = "munge")]
    extern "C" {
        pub fn munge_ctx_create() -> munge_ctx_t;
        pub fn munge_ctx_destroy(ctx: munge_ctx_t);
        pub fn munge_ctx_set(ctx: munge_ctx_t, opt: c_int, ...) -> c_int;
        pub fn munge_ctx_get(ctx: munge_ctx_t, opt: c_int, ...) -> c_int;
        pub fn munge_encode(
            cred: *mut *mut c_char,
            ctx: munge_ctx_t,
            buf: *const c_void,
            len: c_int,
        ) -> c_int;
        pub fn munge_decode(
            cred: *const c_char,
            ctx: munge_ctx_t,
            buf: *mut *mut c_void,
            len: *mut c_int,
            uid: *mut uid_t,
            gid: *mut gid_t,
        ) -> c_int;
        pub fn munge_strerror(e: c_int) -> *const c_char;
    }
}

fn check(code: c_int) -> StatusResult<()> {
    if code == ffi::EMUNGE_SUCCESS {
        Ok(())
    } else {
        Err(AuthorityStatus::from_code(code))
    }
}

/// Authority that delegates to the local `munged` through `libmunge`.
#[derive(Debug, Clone, Default)]
pub struct LibMungeAuthority {
    socket: Option<CString>,
}

impl LibMungeAuthority {
    /// Use the daemon at libmunge's compiled-in socket path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the daemon listening on `path`.
    pub fn with_socket(path: impl AsRef<Path>) -> Result<Self> {
        let socket = CString::new(path.as_ref().as_os_str().as_bytes()).map_err(|_| {
            AuthorityError::InvalidConfig(format!(
                "socket path contains NUL: {}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self {
            socket: Some(socket),
        })
    }
}

impl Authority for LibMungeAuthority {
    type Context = LibMungeContext;

    fn create_context(&self) -> StatusResult<LibMungeContext> {
        // SAFETY: munge_ctx_create has no preconditions; NULL means ENOMEM.
        let raw = unsafe { ffi::munge_ctx_create() };
        let ctx = LibMungeContext {
            ctx: NonNull::new(raw).ok_or(AuthorityStatus::NoMemory)?,
            payload: Zeroizing::default(),
            token: None,
            token_c: None,
            identity: Identity::UNSET,
        };

        if let Some(socket) = &self.socket {
            // SAFETY: ctx is live; libmunge copies the socket path string.
            check(unsafe {
                ffi::munge_ctx_set(ctx.as_ptr(), ffi::MUNGE_OPT_SOCKET, socket.as_ptr())
            })?;
        }
        Ok(ctx)
    }

    fn encode(&self, ctx: &mut LibMungeContext) -> StatusResult<()> {
        let len = c_int::try_from(ctx.payload.len()).map_err(|_| AuthorityStatus::BadLength)?;
        let buf = if ctx.payload.is_empty() {
            ptr::null()
        } else {
            ctx.payload.as_ptr().cast::<c_void>()
        };

        let mut cred: *mut c_char = ptr::null_mut();
        // SAFETY: ctx is live, buf/len describe ctx.payload, and cred
        // receives a malloc'd NUL-terminated string owned by us.
        let code = unsafe { ffi::munge_encode(&mut cred, ctx.as_ptr(), buf, len) };

        if !cred.is_null() {
            // SAFETY: libmunge returned a NUL-terminated string we own.
            ctx.token = Some(unsafe { take_c_string(cred) });
        }
        check(code)
    }

    fn decode(&self, ctx: &mut LibMungeContext) -> StatusResult<()> {
        let token = ctx.token_c.as_ref().ok_or(AuthorityStatus::BadArg)?;

        let mut data: *mut c_void = ptr::null_mut();
        let mut len: c_int = 0;
        let mut uid: uid_t = 0;
        let mut gid: gid_t = 0;
        // SAFETY: ctx is live, token is NUL-terminated, and every out
        // pointer refers to a local of the right type.
        let code = unsafe {
            ffi::munge_decode(
                token.as_ptr().cast::<c_char>(),
                ctx.as_ptr(),
                &mut data,
                &mut len,
                &mut uid,
                &mut gid,
            )
        };

        // SAFETY: data/len come straight from munge_decode.
        let payload = unsafe { take_c_buffer(data, len) };
        check(code)?;

        ctx.payload = payload;
        ctx.identity = Identity::new(uid, gid);
        Ok(())
    }

    fn status_message(&self, status: AuthorityStatus) -> String {
        if status == AuthorityStatus::DeadlineExceeded {
            return status.message().to_owned();
        }
        // SAFETY: munge_strerror returns a static string for any code.
        let msg = unsafe { ffi::munge_strerror(status.code()) };
        if msg.is_null() {
            return status.message().to_owned();
        }
        // SAFETY: non-NULL static NUL-terminated string.
        unsafe { CStr::from_ptr(msg) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Copy, zeroize and free a string allocated by libmunge.
///
/// # Safety
/// `ptr` must be a non-NULL, NUL-terminated, malloc'd string.
unsafe fn take_c_string(ptr: *mut c_char) -> Zeroizing<String> {
    let bytes = CStr::from_ptr(ptr).to_bytes();
    let owned = Zeroizing::new(String::from_utf8_lossy(bytes).into_owned());
    let len = bytes.len();
    std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len).zeroize();
    libc::free(ptr.cast::<c_void>());
    owned
}

/// Copy, zeroize and free a payload buffer allocated by libmunge.
///
/// # Safety
/// `ptr` must be NULL or a malloc'd buffer of at least `len` bytes.
unsafe fn take_c_buffer(ptr: *mut c_void, len: c_int) -> Zeroizing<Vec<u8>> {
    if ptr.is_null() {
        return Zeroizing::default();
    }
    let len = usize::try_from(len).unwrap_or(0);
    let slice = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len);
    let owned = Zeroizing::new(slice.to_vec());
    slice.zeroize();
    libc::free(ptr);
    owned
}

/// Context wrapping a `munge_ctx_t`.
///
/// Rust-side buffers are zeroized when dropped; dropping the context also
/// destroys the C context.
#[derive(Debug)]
pub struct LibMungeContext {
    ctx: NonNull<ffi::munge_ctx>,
    payload: Zeroizing<Vec<u8>>,
    token: Option<Zeroizing<String>>,
    /// The token to decode, NUL-terminated.
    token_c: Option<Zeroizing<Vec<u8>>>,
    identity: Identity,
}

impl LibMungeContext {
    fn as_ptr(&self) -> ffi::munge_ctx_t {
        self.ctx.as_ptr()
    }

    fn set_int(&mut self, opt: c_int, value: c_int) -> StatusResult<()> {
        // SAFETY: ctx is live; integer options take an int vararg.
        check(unsafe { ffi::munge_ctx_set(self.as_ptr(), opt, value) })
    }
}

impl AuthorityContext for LibMungeContext {
    fn set_payload(&mut self, payload: &[u8]) {
        self.payload = Zeroizing::new(payload.to_vec());
    }

    fn set_ttl(&mut self, ttl: TtlRequest) -> StatusResult<()> {
        let value = match ttl {
            TtlRequest::Maximum => ffi::MUNGE_TTL_MAXIMUM,
            TtlRequest::Literal(seconds) => {
                c_int::try_from(seconds).map_err(|_| AuthorityStatus::BadArg)?
            }
        };
        self.set_int(ffi::MUNGE_OPT_TTL, value)
    }

    fn set_uid_restriction(&mut self, uid: u32) -> StatusResult<()> {
        // SAFETY: ctx is live; restriction options take a uid_t vararg.
        check(unsafe {
            ffi::munge_ctx_set(self.as_ptr(), ffi::MUNGE_OPT_UID_RESTRICTION, uid as uid_t)
        })
    }

    fn set_gid_restriction(&mut self, gid: u32) -> StatusResult<()> {
        // SAFETY: ctx is live; restriction options take a gid_t vararg.
        check(unsafe {
            ffi::munge_ctx_set(self.as_ptr(), ffi::MUNGE_OPT_GID_RESTRICTION, gid as gid_t)
        })
    }

    fn set_token(&mut self, token: &str) -> StatusResult<()> {
        let token = CString::new(token).map_err(|_| AuthorityStatus::BadCred)?;
        self.token_c = Some(Zeroizing::new(token.into_bytes_with_nul()));
        Ok(())
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().map(String::as_str)
    }

    fn identity(&self) -> Identity {
        self.identity
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn ttl(&self) -> StatusResult<i64> {
        let mut ttl: c_int = 0;
        // SAFETY: ctx is live; the TTL option writes an int.
        check(unsafe { ffi::munge_ctx_get(self.as_ptr(), ffi::MUNGE_OPT_TTL, &mut ttl as *mut c_int) })?;
        Ok(i64::from(ttl))
    }
}

impl Drop for LibMungeContext {
    fn drop(&mut self) {
        // SAFETY: ctx was created by munge_ctx_create and is destroyed once.
        unsafe { ffi::munge_ctx_destroy(self.ctx.as_ptr()) };
    }
}
