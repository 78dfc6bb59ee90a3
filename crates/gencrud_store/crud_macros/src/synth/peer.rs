//! The `<Model>Actor` peer type.
//!
//! Writes resolve their target through a `ThreadSafeReference` inside the
//! actor's transaction, so the caller's copy of a record is never mutated.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Context, Operation};

pub(super) fn render(cx: &Context<'_>) -> TokenStream {
    let Context {
        model,
        actor,
        vis,
        store,
        ..
    } = cx;

    let operations = Operation::ALL.map(|op| (op.renderer().peer)(cx));
    let doc = format!(
        " Serializes storage access for [`{model}`].\n\n \
         Every operation issued through one actor runs to completion before \
         the next one starts."
    );

    quote! {
        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #actor {
            inner: #store::ModelActor<#model>,
        }

        impl #actor {
            /// Opens the store selected by `configuration`.
            #vis async fn new(
                configuration: #store::Configuration,
            ) -> ::core::result::Result<Self, #store::StoreError> {
                ::core::result::Result::Ok(Self {
                    inner: #store::ModelActor::open(configuration).await?,
                })
            }

            /// Current lifecycle state.
            #vis fn state(&self) -> #store::ActorState {
                self.inner.state()
            }

            /// Configuration of the underlying store.
            #vis fn configuration(&self) -> &#store::Configuration {
                self.inner.configuration()
            }

            /// Closes the actor. Later operations fail and every observation
            /// it started ends.
            #vis fn close(&self) {
                self.inner.close();
            }

            #(#operations)*
        }
    }
}

pub(super) fn create(cx: &Context<'_>) -> TokenStream {
    let Context {
        model, vis, store, ..
    } = cx;
    let params = cx.params();
    let inserts = cx.schema.iter().map(|field| {
        let ident = &field.ident;
        let name = &field.name;
        quote! {
            __gencrud_values.insert(::std::string::String::from(#name), #store::to_value(&#ident)?);
        }
    });

    quote! {
        /// Persists a new record built from the given fields.
        #vis async fn create(
            &self,
            #(#params),*
        ) -> ::core::result::Result<#model, #store::StoreError> {
            let mut __gencrud_values = #store::Values::new();
            #(#inserts)*
            self.inner
                .write(move |__gencrud_txn| __gencrud_txn.create::<#model>(__gencrud_values))
                .await
        }
    }
}

pub(super) fn update(cx: &Context<'_>) -> TokenStream {
    let Context {
        model, vis, store, ..
    } = cx;
    let object = cx.free_ident("object");
    let params = cx.optional_params();
    let idents: Vec<_> = cx.idents().collect();

    quote! {
        /// Sets the given fields of the stored counterpart of the given
        /// record and returns the record as committed.
        ///
        /// Fields passed as `None` keep their stored value.
        #vis async fn update(
            &self,
            #object: &#model,
            #(#params),*
        ) -> ::core::result::Result<#model, #store::StoreError> {
            let __gencrud_reference = #store::ThreadSafeReference::new(#object)?;
            self.inner
                .write(move |__gencrud_txn| {
                    __gencrud_txn.modify(&__gencrud_reference, move |__gencrud_record| {
                        #(
                            if let ::core::option::Option::Some(__gencrud_value) = #idents {
                                __gencrud_record.#idents = __gencrud_value;
                            }
                        )*
                    })
                })
                .await
        }
    }
}

pub(super) fn delete(cx: &Context<'_>) -> TokenStream {
    let Context {
        model, vis, store, ..
    } = cx;
    let object = cx.free_ident("object");

    quote! {
        /// Removes the stored counterpart of the given record.
        #vis async fn delete(
            &self,
            #object: &#model,
        ) -> ::core::result::Result<(), #store::StoreError> {
            let __gencrud_reference = #store::ThreadSafeReference::new(#object)?;
            self.inner
                .write(move |__gencrud_txn| __gencrud_txn.delete(&__gencrud_reference))
                .await
        }
    }
}

pub(super) fn list(cx: &Context<'_>) -> TokenStream {
    let Context {
        model, vis, store, ..
    } = cx;

    quote! {
        /// Returns a snapshot of every stored record.
        #vis async fn list(
            &self,
        ) -> ::core::result::Result<#store::Results<#model>, #store::StoreError> {
            self.inner.objects().await
        }
    }
}

pub(super) fn observe(cx: &Context<'_>) -> TokenStream {
    let Context {
        model, vis, store, ..
    } = cx;

    quote! {
        /// Observes every stored record. Changes are delivered on `context`.
        ///
        /// Pass `ExecutionContext::default()` (`Inline`) to receive changes
        /// on whichever task polls the observation.
        #vis async fn observe(
            &self,
            context: #store::ExecutionContext,
        ) -> ::core::result::Result<#store::Observation<#model>, #store::StoreError> {
            self.inner.observe(context).await
        }
    }
}
