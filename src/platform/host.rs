//! Asset host backed by `fetch` and `Image` loads

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use js_sys::{Function, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlImageElement, Request, RequestCache, RequestInit, Response};

use crate::error::{Result, ShowcaseError};
use crate::probe::{AssetHost, Fetched, ProbeMethod};

#[derive(Debug, Clone, Copy, Default)]
pub struct WebAssetHost;

impl WebAssetHost {
    fn request(url: &str, method: &str) -> Result<Request> {
        let init = RequestInit::new();
        init.set_method(method);
        init.set_cache(RequestCache::NoCache);
        Request::new_with_str_and_init(url, &init).map_err(|e| ShowcaseError::Network {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })
    }

    async fn send(url: &str, method: &str) -> Result<Response> {
        let request = Self::request(url, method)?;
        let window = web_sys::window().ok_or_else(|| ShowcaseError::Network {
            url: url.to_string(),
            reason: "no window".to_string(),
        })?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ShowcaseError::Network {
                url: url.to_string(),
                reason: format!("{:?}", e),
            })?;
        value.dyn_into::<Response>().map_err(|_| ShowcaseError::Network {
            url: url.to_string(),
            reason: "not a Response".to_string(),
        })
    }

    async fn head_ok(url: &str) -> bool {
        match Self::send(url, "HEAD").await {
            Ok(response) => response.ok(),
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }

    /// Resolves once the browser reports load or error for the image
    async fn image_loads(url: &str) -> bool {
        let Ok(img) = HtmlImageElement::new() else {
            return false;
        };
        let mut settle = None;
        let promise = Promise::new(&mut |resolve: Function, _reject: Function| settle = Some(resolve));
        let Some(resolve) = settle else {
            return false;
        };
        let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let loaded = event.type_() == "load";
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_bool(loaded));
        });
        img.set_onload(Some(handler.as_ref().unchecked_ref()));
        img.set_onerror(Some(handler.as_ref().unchecked_ref()));
        let watch = ImageWatch { img, _handler: handler };
        watch.img.set_src(url);
        JsFuture::from(promise)
            .await
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Owns the load/error handler of a pending image check; dropping it
/// detaches the handler before freeing it, even if the check is abandoned
struct ImageWatch {
    img: HtmlImageElement,
    _handler: Closure<dyn FnMut(Event)>,
}

impl Drop for ImageWatch {
    fn drop(&mut self) {
        self.img.set_onload(None);
        self.img.set_onerror(None);
    }
}

impl AssetHost for WebAssetHost {
    fn exists<'a>(&'a self, url: &'a str, method: ProbeMethod) -> LocalBoxFuture<'a, bool> {
        async move {
            match method {
                ProbeMethod::ImageLoad => Self::image_loads(url).await,
                ProbeMethod::Head => Self::head_ok(url).await,
            }
        }
        .boxed_local()
    }

    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Fetched>> {
        async move {
            let response = Self::send(url, "GET").await?;
            if !response.ok() {
                return Err(ShowcaseError::Status {
                    url: url.to_string(),
                    status: response.status(),
                });
            }
            let content_type = response.headers().get("content-type").ok().flatten();
            let text = response.text().map_err(|e| ShowcaseError::Network {
                url: url.to_string(),
                reason: format!("{:?}", e),
            })?;
            let body = JsFuture::from(text)
                .await
                .map_err(|e| ShowcaseError::Network {
                    url: url.to_string(),
                    reason: format!("{:?}", e),
                })?
                .as_string()
                .unwrap_or_default();
            Ok(Fetched { content_type, body })
        }
        .boxed_local()
    }
}
