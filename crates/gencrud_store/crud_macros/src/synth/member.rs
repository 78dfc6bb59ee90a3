//! Forwarders emitted on the model.
//!
//! Each forwarder opens a fresh actor on the default configuration and
//! delegates to it.

use proc_macro2::TokenStream;
use quote::quote;

use super::Context;

fn open_actor(cx: &Context<'_>) -> TokenStream {
    let Context { actor, store, .. } = cx;
    quote! {
        let __gencrud_actor = #actor::new(#store::Configuration::default()).await?;
    }
}

pub(super) fn create(cx: &Context<'_>) -> TokenStream {
    let Context { model, vis, store, .. } = cx;
    let open = open_actor(cx);
    let params = cx.params();
    let idents = cx.idents();
    let doc = format!(" Persists a new `{model}` in the default store and returns it.");

    quote! {
        #[doc = #doc]
        #vis async fn create(#(#params),*) -> ::core::result::Result<Self, #store::StoreError> {
            #open
            __gencrud_actor.create(#(#idents),*).await
        }
    }
}

pub(super) fn update(cx: &Context<'_>) -> TokenStream {
    let Context { model, vis, store, .. } = cx;
    let open = open_actor(cx);
    let params = cx.optional_params();
    let idents: Vec<_> = cx.idents().collect();
    let doc = format!(
        " Sets the given fields of this `{model}` in the default store.\n\n \
         Fields passed as `None` keep their stored value. On success `self` \
         holds the persisted fields as committed."
    );

    quote! {
        #[doc = #doc]
        #vis async fn update(
            &mut self,
            #(#params),*
        ) -> ::core::result::Result<(), #store::StoreError> {
            #open
            let mut __gencrud_record = __gencrud_actor.update(self, #(#idents),*).await?;
            #(::core::mem::swap(&mut self.#idents, &mut __gencrud_record.#idents);)*
            ::core::result::Result::Ok(())
        }
    }
}

pub(super) fn delete(cx: &Context<'_>) -> TokenStream {
    let Context { model, vis, store, .. } = cx;
    let open = open_actor(cx);
    let doc = format!(" Removes this `{model}` from the default store.");

    quote! {
        #[doc = #doc]
        #vis async fn delete(&self) -> ::core::result::Result<(), #store::StoreError> {
            #open
            __gencrud_actor.delete(self).await
        }
    }
}

pub(super) fn list(cx: &Context<'_>) -> TokenStream {
    let Context { model, vis, store, .. } = cx;
    let open = open_actor(cx);
    let doc = format!(" Returns every `{model}` in the default store.");

    quote! {
        #[doc = #doc]
        #vis async fn list() -> ::core::result::Result<#store::Results<Self>, #store::StoreError> {
            #open
            __gencrud_actor.list().await
        }
    }
}

pub(super) fn observe(cx: &Context<'_>) -> TokenStream {
    let Context { model, vis, store, .. } = cx;
    let open = open_actor(cx);
    let doc = format!(
        " Observes every `{model}` in the default store.\n\n \
         The first change delivered is the initial collection. Pass \
         `ExecutionContext::default()` (`Inline`) to receive changes on \
         whichever task polls the observation."
    );

    quote! {
        #[doc = #doc]
        #vis async fn observe(
            context: #store::ExecutionContext,
        ) -> ::core::result::Result<#store::Observation<Self>, #store::StoreError> {
            #open
            __gencrud_actor.observe(context).await
        }
    }
}
